use anyhow::{bail, Context};
use clap::Parser;

use wuxing_lib::{
    Branch, DayMaster, Element, ElementSummary, Gender, Location, PillarInput, Stem, WuxingInput,
    WuxingResult,
};

#[derive(Parser, Debug)]
#[command(name = "wuxing", version, about = "Wu Xing five-element chart engine")]
struct Args {
    #[arg(long, value_name = "STEM")]
    year_stem: String,
    #[arg(long, value_name = "BRANCH")]
    year_branch: String,
    #[arg(long, value_name = "STEM")]
    month_stem: String,
    #[arg(long, value_name = "BRANCH")]
    month_branch: String,
    #[arg(long, value_name = "STEM")]
    day_stem: String,
    #[arg(long, value_name = "BRANCH")]
    day_branch: String,
    #[arg(long, value_name = "STEM")]
    hour_stem: Option<String>,
    #[arg(long, value_name = "BRANCH")]
    hour_branch: Option<String>,
    #[arg(long)]
    age: u32,
    #[arg(long, value_name = "m|f")]
    gender: String,
    #[arg(long, default_value = "hometown", value_name = "hometown|out_of_town|overseas")]
    location: String,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .with_target(false)
        .init();

    let input = build_input(&args)?;
    let result = wuxing_lib::compute(input).context("chart computation failed")?;

    print_elements(&result);
    print_day_master(&result.day_master);
    print_gods(&result);
    print_interactions(&result);

    Ok(())
}

fn build_input(args: &Args) -> anyhow::Result<WuxingInput> {
    let hour_pillar = match (&args.hour_stem, &args.hour_branch) {
        (Some(s), Some(b)) => Some(PillarInput::new(parse_stem(s)?, parse_branch(b)?)),
        (None, None) => None,
        _ => bail!("--hour-stem and --hour-branch must be given together"),
    };

    Ok(WuxingInput {
        year_pillar: PillarInput::new(parse_stem(&args.year_stem)?, parse_branch(&args.year_branch)?),
        month_pillar: PillarInput::new(parse_stem(&args.month_stem)?, parse_branch(&args.month_branch)?),
        day_pillar: PillarInput::new(parse_stem(&args.day_stem)?, parse_branch(&args.day_branch)?),
        hour_pillar,
        age: args.age,
        gender: parse_gender(&args.gender)?,
        location: parse_location(&args.location)?,
    })
}

fn parse_stem(s: &str) -> anyhow::Result<Stem> {
    Stem::ALL
        .into_iter()
        .find(|stem| stem.label().eq_ignore_ascii_case(s))
        .with_context(|| format!("unknown heavenly stem '{s}'"))
}

fn parse_branch(s: &str) -> anyhow::Result<Branch> {
    Branch::ALL
        .into_iter()
        .find(|branch| branch.label().eq_ignore_ascii_case(s))
        .with_context(|| format!("unknown earthly branch '{s}'"))
}

fn parse_gender(s: &str) -> anyhow::Result<Gender> {
    match s.to_ascii_lowercase().as_str() {
        "m" | "male" => Ok(Gender::M),
        "f" | "female" => Ok(Gender::F),
        _ => bail!("gender must be m|f, got '{s}'"),
    }
}

fn parse_location(s: &str) -> anyhow::Result<Location> {
    match s.to_ascii_lowercase().as_str() {
        "hometown" => Ok(Location::Hometown),
        "out_of_town" => Ok(Location::OutOfTown),
        "overseas" => Ok(Location::Overseas),
        _ => bail!("location must be hometown|out_of_town|overseas, got '{s}'"),
    }
}

fn print_elements(result: &WuxingResult) {
    println!("Elements");
    for element in Element::ALL {
        let ElementSummary { total, percent, rank } = result.elements[&element];
        println!("- {element}: total {total:.2} | percent {percent:.2}% | rank {rank}");
    }
    println!();
}

fn print_day_master(dm: &DayMaster) {
    println!("Day master");
    println!("- {} ({}), {:.2}% -> {:?}", dm.stem, dm.element, dm.percent, dm.strength);
    println!();
}

fn print_gods(result: &WuxingResult) {
    println!("Gods");
    for (role, element) in result.gods.pairs() {
        println!("- {role:?}: {element}");
    }
    println!();
}

fn print_interactions(result: &WuxingResult) {
    println!("Interaction log ({} entries)", result.interactions.len());
    for entry in &result.interactions {
        println!("- step {}: {}", entry.step, entry.kind);
    }
}
