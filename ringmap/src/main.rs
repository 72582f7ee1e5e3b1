use commands::command_argument_builder;
use ringmap::handlers;

pub use ringmap::CLAP_STYLING;

mod commands;

const BANNER: &str = r#"
        _
   _ __(_)_ __   __ _ _ __ ___   __ _ _ __
  | '__| | '_ \ / _` | '_ ` _ \ / _` | '_ \
  | |  | | | | | (_| | | | | | | (_| | |_) |
  |_|  |_|_| |_|\__, |_| |_| |_|\__,_| .__/
                |___/                |_|
"#;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        println!("{}", BANNER);
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handlers::handle_crawl(primary_command).await,
        Some(("analyze", primary_command)) => handlers::handle_analyze(primary_command),
        Some(("list", primary_command)) => handlers::handle_list(primary_command),
        Some(("path", primary_command)) => handlers::handle_path(primary_command),
        Some(("neighbors", primary_command)) => handlers::handle_neighbors(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
