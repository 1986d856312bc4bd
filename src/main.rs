//! themeswitch command-line interface.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use themeswitch::app::App;
use themeswitch::driver::apply_now;
use themeswitch::host::ThemeHost;
use themeswitch::logging;

/// Switch between light and dark themes on a daily schedule
#[derive(Parser)]
#[command(name = "themeswitch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep switching themes every few seconds (default)
    Run,

    /// Show what would be applied right now
    Status {
        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply the current decision once and exit
    Apply,

    /// Edit and persist the schedule
    Set(SetArgs),

    /// List the color schemes known to the host
    Schemes,
}

#[derive(Args)]
struct SetArgs {
    /// Start of the dark window (HH:mm)
    #[arg(long)]
    start: Option<String>,

    /// End of the dark window (HH:mm)
    #[arg(long)]
    end: Option<String>,

    /// Color scheme used outside the dark window
    #[arg(long)]
    light: Option<String>,

    /// Color scheme used inside the dark window
    #[arg(long)]
    dark: Option<String>,

    /// Follow the operating system dark mode instead of the schedule
    #[arg(long)]
    follow_os: Option<bool>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_default(match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    });

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => themeswitch::run().context("theme switcher stopped"),
        Commands::Status { json } => status(json),
        Commands::Apply => apply(),
        Commands::Set(args) => set(args),
        Commands::Schemes => schemes(),
    }
}

fn status(json: bool) -> Result<()> {
    let app = App::load().context("failed to load settings")?;
    let settings = app.settings().snapshot();
    let decision = app.decision_now();
    let applied = app.applied_state();
    if json {
        let report = serde_json::json!({ "decision": decision, "applied": applied });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let window = settings.dark_window();
    println!(
        "window:     {} - {}",
        window.start().format("%H:%M"),
        window.end().format("%H:%M")
    );
    println!("follow os:  {}", settings.follow_os_dark_mode);
    println!("appearance: {}", decision.appearance);
    println!("scheme:     {}", decision.color_scheme());
    match (applied.look_and_feel, applied.color_scheme.as_deref()) {
        (Some(appearance), Some(scheme)) => println!("applied:    {appearance} ({scheme})"),
        (Some(appearance), None) => println!("applied:    {appearance}"),
        (None, Some(scheme)) => println!("applied:    ({scheme})"),
        (None, None) => println!("applied:    nothing yet"),
    }
    Ok(())
}

fn apply() -> Result<()> {
    let app = App::load().context("failed to load settings")?;
    let decision = app.decision_now();
    let appearance = apply_now(app.host(), &decision)
        .with_context(|| format!("failed to apply scheme {:?}", decision.color_scheme()))?;
    println!("applied {appearance} ({})", decision.color_scheme());
    Ok(())
}

fn set(args: SetArgs) -> Result<()> {
    let app = App::load().context("failed to load settings")?;
    let mut form = app.settings_form();

    if let Some(start) = args.start {
        form.set_start_text(start);
    }
    if let Some(end) = args.end {
        form.set_end_text(end);
    }
    if let Some(light) = args.light {
        form.set_light_scheme(light);
    }
    if let Some(dark) = args.dark {
        form.set_dark_scheme(dark);
    }
    if let Some(follow) = args.follow_os {
        form.set_follow_os(follow)?;
    }

    if !form.is_modified() {
        println!("nothing to change");
        return Ok(());
    }

    for scheme in [form.light_scheme(), form.dark_scheme()] {
        if !form.scheme_names().iter().any(|known| known == scheme) {
            tracing::warn!(scheme, "scheme is not known to the host");
        }
    }

    form.apply().context("Invalid time specified!")?;
    app.save().context("failed to save settings")?;
    println!("settings saved");
    Ok(())
}

fn schemes() -> Result<()> {
    let app = App::load_or_defaults();
    let settings = app.settings().snapshot();
    for name in app.host().scheme_names() {
        let marker = match (name == settings.light_scheme, name == settings.dark_scheme) {
            (true, true) => " (light, dark)",
            (true, false) => " (light)",
            (false, true) => " (dark)",
            (false, false) => "",
        };
        println!("{name}{marker}");
    }
    Ok(())
}
