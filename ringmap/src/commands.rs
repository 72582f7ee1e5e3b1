use crate::CLAP_STYLING;
use clap::{arg, command};
use ringmap_core::members::DEFAULT_REGISTRY_URL;

fn data_dir_arg() -> clap::Arg {
    arg!(-d --"data-dir" <PATH>)
        .required(false)
        .help("Directory holding the crawl and analysis artifacts")
        .default_value(".")
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("ringmap")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("ringmap")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Fetch the member registry and crawl every homepage, classifying \
                friend-link directories and recording who links to whom.",
                )
                .arg(data_dir_arg())
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the worker pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("16"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"registry" <URL>)
                        .required(false)
                        .help("Member registry endpoint")
                        .default_value(DEFAULT_REGISTRY_URL),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Disable the progress spinner (useful for logs and CI)")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("analyze")
                .about(
                    "Build the connectivity graph from the crawl artifacts and write \
                the graph snapshot, statistics, CSV and Markdown reports.",
                )
                .arg(data_dir_arg()),
        )
        .subcommand(
            command!("list")
                .about("List members with their connectivity statistics")
                .arg(data_dir_arg())
                .arg(
                    arg!(-p --"page" <PAGE>)
                        .required(false)
                        .help("Page number (32 members per page)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(-s --"search" <QUERY>)
                        .required(false)
                        .help("Filter by substring over id, name, url and links page"),
                ),
        )
        .subcommand(
            command!("path")
                .about("Show every shortest link path between two members")
                .arg(data_dir_arg())
                .arg(
                    arg!(<FROM>)
                        .required(true)
                        .help("Source member, by id or host"),
                )
                .arg(
                    arg!(<TO>)
                        .required(true)
                        .help("Target member, by id or host"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Emit the result as JSON instead of text")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("neighbors")
                .about("List the members a member links to, or is linked from")
                .arg(data_dir_arg())
                .arg(
                    arg!(<MEMBER>)
                        .required(true)
                        .help("Member to inspect, by id or host"),
                )
                .arg(
                    arg!(--"incoming")
                        .required(false)
                        .help("Show members linking here instead of members linked to")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
