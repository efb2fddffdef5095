use std::path::Path;

use crate::cli::commands::usage;
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write all transactions to a .csv (or .xlsx) file",
            "export <path>",
            cmd_export,
        ),
        CommandEntry::new("import", "Add transactions from a CSV file", "import <path>", cmd_import),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(usage("export <path>"));
    };
    let path = Path::new(path);
    let format = context.store.export(path)?;
    cli_io::print_success(format!(
        "Exported {} transactions to {} ({}).",
        context.store.list().len(),
        path.display(),
        format.extension()
    ));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(usage("import <path>"));
    };
    let report = context.store.import_csv_path(Path::new(path))?;
    cli_io::print_success(format!("Imported {} transactions.", report.imported));
    if report.skipped_count() > 0 {
        cli_io::print_warning(format!("Skipped {} rows:", report.skipped_count()));
        for row in &report.skipped {
            cli_io::print_info(format!("  line {}: {}", row.line, row.reason));
        }
    }
    Ok(())
}
