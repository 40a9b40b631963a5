use markdown::mdast::{Definition, Heading, Node, Text};
use std::collections::HashMap;
use std::fs;

use camino::Utf8PathBuf;
use cargo_metadata::{CargoOpt, MetadataCommand, Package};

const DRIVER_PACKAGE: &str = "piicodev-veml6030";

const REQUIRED_LINKS: [&str; 4] = [
    "Official Hardware Repository",
    "Official MicroPython Repository",
    "Official Product Site",
    "Datasheet",
];

const TITLE_PREFIX: &str = "Unofficial Rust Driver for PiicoDev ";

fn find_definition<'a>(node: &'a Node, needle_label: &str) -> Option<&'a Definition> {
    node.children()?.iter().find_map(|n| match *n {
        Node::Definition(ref definition) if definition.label.as_deref() == Some(needle_label) => {
            Some(definition)
        }
        _ => None,
    })
}

fn find_main_heading(node: &Node) -> Option<&Heading> {
    node.children()?.iter().find_map(|n| match *n {
        Node::Heading(ref heading) if heading.depth == 1 => Some(heading),
        _ => None,
    })
}

fn text(node: &Heading) -> Option<String> {
    match node.children.last() {
        Some(Node::Text(Text { value, .. })) => Some(value.clone()),
        _ => None,
    }
}

fn driver_package(packages: &[Package]) -> &Package {
    packages
        .iter()
        .find(|package| package.name == DRIVER_PACKAGE)
        .unwrap_or_else(|| panic!("{DRIVER_PACKAGE} not found in workspace"))
}

/// Checks the driver README: a title with the usual prefix, every reference link defined, and no
/// two references pointing at the same URL.
fn ci() {
    let metadata = MetadataCommand::new()
        .manifest_path("./Cargo.toml")
        .features(CargoOpt::AllFeatures)
        .exec()
        .unwrap();

    let package = driver_package(&metadata.packages);
    let readme_path: Utf8PathBuf = package
        .readme()
        .unwrap_or_else(|| panic!("{DRIVER_PACKAGE} declares no readme"));
    let contents = fs::read_to_string(&readme_path).unwrap();
    let mdast = markdown::to_mdast(&contents, &markdown::ParseOptions::gfm()).unwrap();

    let heading = find_main_heading(&mdast);
    assert!(heading.is_some(), "no heading in {readme_path:?}");
    let title = heading.and_then(text).unwrap_or_default();
    assert!(
        title.starts_with(TITLE_PREFIX),
        "title {title:?} does not start with {TITLE_PREFIX:?}"
    );

    let mut urls: HashMap<String, &str> = HashMap::new();
    for label in REQUIRED_LINKS {
        let definition = find_definition(&mdast, label)
            .unwrap_or_else(|| panic!("{label} definition not found in {readme_path}"));
        if let Some(previous) = urls.insert(definition.url.clone(), label) {
            panic!("{label} and {previous} share {}", definition.url);
        }
    }
    println!("{readme_path}: ok");
}

fn main() {
    let cmd = clap::Command::new("xtask")
        .bin_name("xtask")
        .subcommand_required(true)
        .subcommand(clap::command!("ci"));
    let matches = cmd.get_matches();
    match matches.subcommand() {
        Some(("ci", _)) => ci(),
        _ => unreachable!("clap should ensure we don't get here"),
    };
}
