use crate::output::print_table;
use admenu_core::registry::{ActionRegistry, Operation};
use admenu_core::runner::OutputMode;

pub fn run() -> anyhow::Result<()> {
    let registry = ActionRegistry::standard();
    let rows = registry
        .catalog()
        .into_iter()
        .map(|(selector, group, action)| {
            let inputs = action
                .prompts
                .iter()
                .map(|p| p.kind.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let command = match &action.operation {
                Operation::Run(template) => template.program.to_string(),
                Operation::AddCronEntry | Operation::DeleteCronEntry => "crontab".to_string(),
                Operation::FindMax => "(built-in)".to_string(),
            };
            let output = match (&action.operation, action.output) {
                (Operation::FindMax, _) => "-",
                (_, OutputMode::Stream) => "stream",
                (_, OutputMode::Capture) => "capture",
            };
            vec![
                selector.to_string(),
                group.title.to_string(),
                action.title.to_string(),
                if inputs.is_empty() { "-".to_string() } else { inputs },
                command,
                output.to_string(),
                if action.requires_privilege { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();

    print_table(
        &["CHOICE", "GROUP", "ACTION", "INPUTS", "COMMAND", "OUTPUT", "PRIV"],
        rows,
    );
    Ok(())
}
