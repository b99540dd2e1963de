use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;
use vrkit_common::{SceneObject, Transform};
use vrkit_locate::{SurfaceData, SurfaceLocator, SurfaceLocatorConfig};
use vrkit_observable::{ObservableCounter, ObservableStack, StackConfig};
use vrkit_rule::{MatcherConfig, load_config};
use vrkit_scene::SceneDescription;

#[derive(Parser)]
#[command(name = "vrkit-cli", about = "CLI harness for the vrkit interaction core")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info
    Info,
    /// Report which named rules match each object of a scene
    Match {
        /// Matcher configuration (YAML or JSON)
        #[arg(short, long)]
        rules: PathBuf,
        /// Scene description (YAML or JSON)
        #[arg(short, long)]
        scene: PathBuf,
    },
    /// Trace the events of a stack scenario
    Stack {
        /// Number of event slots
        #[arg(long, default_value = "3")]
        slots: usize,
        /// Elements to push, bottom first
        #[arg(long, num_args = 1.., required = true)]
        push: Vec<String>,
        /// Element to pop, together with everything above it
        #[arg(long)]
        pop_at: Option<String>,
        /// Abort the pop cascade after this many pop notifications
        #[arg(long)]
        abort_after: Option<usize>,
    },
    /// Trace the events of a counter scenario
    Counter {
        /// Elements to count up, in order
        #[arg(long, num_args = 0..)]
        add: Vec<String>,
        /// Elements to count down, in order
        #[arg(long, num_args = 0..)]
        remove: Vec<String>,
    },
    /// Run one surface locator pass against a scene
    Locate {
        /// Scene description (YAML or JSON)
        #[arg(short, long)]
        scene: PathBuf,
        /// Locator configuration (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Search origin
        #[arg(long, num_args = 3, default_values_t = [0.0, 0.0, 0.0], allow_hyphen_values = true)]
        origin: Vec<f32>,
        /// Search direction
        #[arg(long, num_args = 3, default_values_t = [0.0, 0.0, -1.0], allow_hyphen_values = true)]
        direction: Vec<f32>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("vrkit-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", vrkit_common::crate_info());
            println!("observable: {}", vrkit_observable::crate_info());
            println!("rule: {}", vrkit_rule::crate_info());
            println!("scene: {}", vrkit_scene::crate_info());
            println!("locate: {}", vrkit_locate::crate_info());
        }
        Commands::Match { rules, scene } => run_match(&rules, &scene)?,
        Commands::Stack {
            slots,
            push,
            pop_at,
            abort_after,
        } => run_stack(slots, push, pop_at, abort_after)?,
        Commands::Counter { add, remove } => run_counter(add, &remove),
        Commands::Locate {
            scene,
            config,
            origin,
            direction,
        } => run_locate(&scene, config.as_deref(), &origin, &direction)?,
    }

    Ok(())
}

fn run_match(rules: &std::path::Path, scene: &std::path::Path) -> anyhow::Result<()> {
    let config: MatcherConfig =
        load_config(rules).with_context(|| format!("loading rules {}", rules.display()))?;
    let description: SceneDescription =
        load_config(scene).with_context(|| format!("loading scene {}", scene.display()))?;
    let matcher = config.build::<SceneObject>()?;
    let scene = description.into_scene();
    tracing::info!(
        rules = %rules.display(),
        elements = matcher.elements.len(),
        objects = scene.object_count(),
        "matcher built"
    );

    println!(
        "Matching {} objects against {} rules",
        scene.object_count(),
        matcher.elements.len()
    );
    for object in scene.objects() {
        let names = matcher.matching_names(object);
        if names.is_empty() {
            println!("{}: (none)", object.name);
        } else {
            println!("{}: {}", object.name, names.join(", "));
        }
    }
    Ok(())
}

fn run_stack(
    slots: usize,
    push: Vec<String>,
    pop_at: Option<String>,
    abort_after: Option<usize>,
) -> anyhow::Result<()> {
    let mut stack: ObservableStack<String> =
        ObservableStack::from_config(&StackConfig { slot_count: slots })?;
    tracing::info!(slots, pushes = push.len(), ?pop_at, ?abort_after, "stack scenario");
    let abort = stack.abort_handle();
    let pops = Rc::new(Cell::new(0usize));

    for index in 0..stack.slot_count() {
        let Some(events) = stack.slot_mut(index) else {
            continue;
        };
        events
            .pushed
            .subscribe(move |e: &String| println!("[slot {index}] pushed {e}"));
        events
            .restored
            .subscribe(move |e: &String| println!("[slot {index}] restored {e}"));

        for (label, event) in [
            ("popped", &mut events.popped),
            ("force popped", &mut events.force_popped),
        ] {
            let abort = abort.clone();
            let pops = Rc::clone(&pops);
            event.subscribe(move |e: &String| {
                println!("[slot {index}] {label} {e}");
                pops.set(pops.get() + 1);
                if abort_after.is_some_and(|limit| pops.get() >= limit) {
                    println!("  abort requested");
                    abort.abort();
                }
            });
        }
    }

    for element in push {
        stack.push(element);
    }
    if let Some(target) = pop_at {
        stack.pop_at(&target);
    }

    println!(
        "Final: depth={}, elements=[{}]",
        stack.depth(),
        stack.as_slice().join(", ")
    );
    Ok(())
}

fn run_counter(add: Vec<String>, remove: &[String]) {
    tracing::info!(adds = add.len(), removes = remove.len(), "counter scenario");
    let mut counter: ObservableCounter<String> = ObservableCounter::new();
    counter
        .events
        .added
        .subscribe(|e: &String| println!("added {e}"));
    counter
        .events
        .removed
        .subscribe(|e: &String| println!("removed {e}"));

    for element in add {
        counter.increase_count(element);
    }
    for element in remove {
        counter.decrease_count(element);
    }

    for (element, count) in counter.iter() {
        println!("{element}: {count}");
    }
}

fn run_locate(
    scene: &std::path::Path,
    config: Option<&std::path::Path>,
    origin: &[f32],
    direction: &[f32],
) -> anyhow::Result<()> {
    let description: SceneDescription =
        load_config(scene).with_context(|| format!("loading scene {}", scene.display()))?;
    let config: SurfaceLocatorConfig = match config {
        Some(path) => {
            load_config(path).with_context(|| format!("loading locator {}", path.display()))?
        }
        None => SurfaceLocatorConfig::default(),
    };
    let scene = description.into_scene();

    let mut locator = SurfaceLocator::from_config(&config)?;
    locator.search_origin = Some(Transform::from_position(Vec3::from_slice(origin)));
    locator.search_direction = Some(Vec3::from_slice(direction));
    locator.surface_located.subscribe(|data: &SurfaceData| {
        println!(
            "surface located: object={} position={} normal={} distance={:.3}",
            data.object, data.position, data.normal, data.distance
        );
    });

    tracing::info!(
        origin = %Vec3::from_slice(origin),
        direction = %Vec3::from_slice(direction),
        max_distance = locator.maximum_distance,
        "locating surface"
    );
    locator.process(&scene);
    match locator.surface() {
        Some(surface) => {
            let name = scene
                .get(surface.object)
                .map_or("?", |object| object.name.as_str());
            println!("Located: {name}");
        }
        None => println!("No surface located"),
    }
    Ok(())
}
