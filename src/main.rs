use anyhow::{Context, Result};
use blogomatic::build::build_post;
use blogomatic::config::{Config, Overrides};
use blogomatic::logging;
use blogomatic::prompt::TerminalPrompter;
use clap::{App, Arg};
use std::path::PathBuf;

fn main() -> Result<()> {
    let matches = App::new("blogomatic")
        .about("Builds a static HTML blog post from article metadata and a contributor registry")
        .arg(
            Arg::with_name("blog_author")
                .long("blog_author")
                .takes_value(true)
                .help("required - the author of this blog post (must be in the contributors file)"),
        )
        .arg(
            Arg::with_name("article_file")
                .long("article_file")
                .takes_value(true)
                .help("optional - article file name (must be in ./articles)"),
        )
        .arg(
            Arg::with_name("contributor_file")
                .long("contributor_file")
                .takes_value(true)
                .help("name of file containing contributor information (must be in ./content)"),
        )
        .arg(
            Arg::with_name("standard_file")
                .long("standard_file")
                .takes_value(true)
                .help("name of file containing standard blog greeting and other info (must be in ./content)"),
        )
        .arg(
            Arg::with_name("blog_template")
                .long("blog_template")
                .takes_value(true)
                .help("name of file containing the blog template for output (must be in ./templates)"),
        )
        .arg(
            Arg::with_name("root")
                .long("root")
                .takes_value(true)
                .default_value(".")
                .help("project directory (or any directory below it)"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("more logging; repeat for more"),
        )
        .get_matches();

    logging::init(matches.occurrences_of("verbose"));

    let owned = |name: &str| matches.value_of(name).map(str::to_owned);
    let root = PathBuf::from(matches.value_of("root").unwrap_or("."));
    let config = Config::from_directory(
        &root,
        Overrides {
            blog_author: owned("blog_author"),
            article_file: owned("article_file"),
            contributor_file: owned("contributor_file"),
            standard_file: owned("standard_file"),
            blog_template: owned("blog_template"),
        },
    )?;

    let today = chrono::Local::now().date_naive();
    let output = build_post(&config, &mut TerminalPrompter, today)
        .context("Building the blog post")?;
    println!("success - file created - {}", output.display());
    Ok(())
}
