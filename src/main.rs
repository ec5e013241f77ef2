use clap::Parser;
use git_fault::commands::split;
use git_fault::config::Config;
use git_fault::git::find_repository;

#[derive(Parser)]
#[command(name = "git-fault")]
#[command(about = "Rewrite uncommitted changes as commits attributed by line authorship")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {}

fn main() {
    Config::init();
    let _cli = Cli::parse();

    let result = find_repository().and_then(|repo| split::run(&repo));
    match result {
        Ok(commits) if commits.is_empty() => {
            println!("git-fault: no pending modifications to split");
        }
        Ok(commits) => {
            println!("git-fault: created {} commit(s)", commits.len());
        }
        Err(err) => {
            eprintln!("git-fault: {}", err);
            std::process::exit(1);
        }
    }
}
