mod client;
mod config;
mod controller;
mod export;
mod form;
mod logging;
mod notify;
mod tui;
mod validate;

use anyhow::Result;
use clap::Parser;
use config::{ConfigFile, ResolvedConfig};
use controller::Controller;
use form::{FormInput, GOAL_CATALOG, SustainabilityGoal};
use notify::{NoticeKind, Notifier};

#[derive(Parser, Debug)]
#[command(
    name = "cityplan",
    about = "A terminal client for AI-assisted urban development planning",
    long_about = None,
)]
struct Args {
    /// Profile to use from config file
    #[arg(short, long, env = "CITYPLAN_PROFILE")]
    profile: Option<String>,

    /// Override plan service endpoint URL
    #[arg(long, env = "CITYPLAN_ENDPOINT")]
    endpoint: Option<String>,

    /// Override request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Write a default config file to ~/.config/cityplan/config.toml and exit
    #[arg(long)]
    init: bool,

    /// List available profiles and exit
    #[arg(long)]
    profiles: bool,

    // ── One-shot scenario flags (any of these skips the TUI) ──────────────────
    /// Land area in acres
    #[arg(long, value_name = "ACRES")]
    land_area: Option<String>,

    /// Current population
    #[arg(long, value_name = "COUNT")]
    population: Option<String>,

    /// Zoning type (residential, commercial, mixed…)
    #[arg(long)]
    zoning: Option<String>,

    /// Existing infrastructure, comma-separated
    #[arg(long, value_name = "LIST")]
    infrastructure: Option<String>,

    /// Sustainability goal, repeatable (tag or label)
    #[arg(long = "goal", value_name = "GOAL")]
    goals: Vec<String>,

    /// Development budget in millions
    #[arg(long, value_name = "MILLIONS")]
    budget: Option<String>,

    /// Copy the generated plan to the clipboard (one-shot mode)
    #[arg(long)]
    copy: bool,
}

impl Args {
    fn wants_one_shot(&self) -> bool {
        self.land_area.is_some()
            || self.population.is_some()
            || self.zoning.is_some()
            || self.infrastructure.is_some()
            || !self.goals.is_empty()
            || self.budget.is_some()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // ── --init ────────────────────────────────────────────────────────────────
    if args.init {
        let path = ConfigFile::write_default_if_missing()?;
        println!("Config written to: {}", path.display());
        println!("Edit it, then run: cityplan");
        return Ok(());
    }

    let file = ConfigFile::load()?;

    // ── --profiles ────────────────────────────────────────────────────────────
    if args.profiles {
        print_profiles(&file);
        return Ok(());
    }

    let resolved = ResolvedConfig::resolve(
        &file,
        args.profile.as_deref(),
        args.endpoint.as_deref(),
        args.timeout_secs,
    );

    // ── One-shot mode (plain stdout, no TUI) ──────────────────────────────────
    if args.wants_one_shot() {
        logging::init_stderr();
        return run_one_shot(args, resolved).await;
    }

    // ── Interactive TUI mode ──────────────────────────────────────────────────
    logging::init_file()?;
    tui::run(resolved).await
}

// ── One-shot mode (plain stdout, no TUI) ──────────────────────────────────────

/// Prints notices straight to the terminal in place of toasts.
struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&mut self, kind: NoticeKind, message: String) {
        match kind {
            NoticeKind::Success => println!("  ✓ {message}"),
            NoticeKind::Error => eprintln!("  ✗ {message}"),
        }
    }
}

async fn run_one_shot(args: Args, resolved: ResolvedConfig) -> Result<()> {
    println!();
    println!(
        "  ⌂ cityplan  {}  ·  {}  ·  {}",
        resolved.profile_name,
        resolved.endpoint,
        chrono::Local::now().format("%b %e %H:%M"),
    );
    println!();

    let mut form = FormInput::new();
    if let Some(v) = args.land_area {
        form.set_land_area(v);
    }
    if let Some(v) = args.population {
        form.set_population(v);
    }
    if let Some(v) = args.zoning {
        form.set_zoning(v);
    }
    if let Some(v) = args.infrastructure {
        form.set_infrastructure(v);
    }
    if let Some(v) = args.budget {
        form.set_budget(v);
    }
    for raw in &args.goals {
        match SustainabilityGoal::from_arg(raw) {
            Some(goal) => form.toggle_goal(goal),
            None => {
                eprintln!("  ✗ Unknown sustainability goal: {raw}");
                eprintln!("    Available goals:");
                for g in GOAL_CATALOG {
                    eprintln!("      {}  ({})", g.tag(), g.label());
                }
                std::process::exit(2);
            }
        }
    }

    let mut controller = Controller::new();
    *controller.form_mut() = form;

    let mut notifier = PrintNotifier;
    let Some(dispatch) = controller.submit(&mut notifier) else {
        // The notifier already named the missing field
        std::process::exit(1);
    };

    let client = client::PlanClient::new(resolved.endpoint.clone(), resolved.timeout)?;
    let outcome = client.submit(&dispatch.request).await;
    let succeeded = outcome.is_ok();
    controller.apply_response(dispatch.seq, outcome, &mut notifier);

    if !succeeded {
        std::process::exit(1);
    }

    println!("{}", controller.plan_text());
    if let Some(score) = controller.sustainability_score() {
        println!();
        println!("  sustainability score: {score:.1}");
    }

    if args.copy {
        let mut clipboard = export::SystemClipboard::new()?;
        export::copy_plan(controller.plan_text(), &mut clipboard, &mut notifier);
    }

    Ok(())
}

// ── Profiles listing (non-TUI) ────────────────────────────────────────────────

fn print_profiles(file: &ConfigFile) {
    let mut entries: Vec<(String, String, u64)> = file
        .profiles
        .iter()
        .map(|(name, p)| (name.clone(), p.endpoint.clone(), p.timeout_secs))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    println!();
    println!("  Profiles");
    for (name, endpoint, timeout) in &entries {
        let marker = if *name == file.default_profile { " ←" } else { "" };
        println!("  {name}{marker}");
        println!("    endpoint  {endpoint}");
        println!("    timeout   {timeout}s");
        println!();
    }
}
