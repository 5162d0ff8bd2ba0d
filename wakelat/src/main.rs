use clap::{Parser, ValueEnum};
use log::error;
use std::process;
use wakelat::{drivers, report};
use wakelat_common::{
    available_cpus, BenchConfig, Scenario, SchedulingHint, DEFAULT_ARRIVAL_RATE_US,
    DEFAULT_LOOP_COUNT, DEFAULT_SERVICE_TIME_US,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "wakelat", about = "Scheduler wakeup latency harness")]
struct Args {
    /// Arrival time between periodic wakeups (microseconds)
    #[arg(short = 'a', long, default_value_t = DEFAULT_ARRIVAL_RATE_US)]
    arrival_rate: u64,

    /// Number of loops; must be a multiple of 10000
    #[arg(short = 'l', long, default_value_t = DEFAULT_LOOP_COUNT)]
    loops: u64,

    /// List scenarios and exit
    #[arg(short = 'L', long)]
    list: bool,

    /// Service time (microseconds); reserved
    #[arg(short = 's', long, default_value_t = DEFAULT_SERVICE_TIME_US)]
    service_time: u64,

    /// Worker thread count [default: available CPUs]
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// RT policy (0: non-RT, 1: FIFO, 2: RR)
    #[arg(short = 'R', long, default_value_t = 0)]
    rt_policy: u8,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scenario to run; all scenarios run when omitted
    scenario: Option<String>,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "info" } else { "warn" }),
    )
    .init();

    if args.list {
        for scenario in Scenario::all() {
            println!("{}", scenario.as_name());
        }
        return;
    }

    let scheduling = SchedulingHint::from_policy_code(args.rt_policy).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let config = BenchConfig {
        arrival_rate_us: args.arrival_rate,
        service_time_us: args.service_time,
        loop_count: args.loops,
        thread_count: args.threads.unwrap_or_else(available_cpus),
        scheduling,
    };
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        process::exit(1);
    }

    let scenarios = match args.scenario.as_deref() {
        None => Scenario::all().to_vec(),
        Some(name) => match Scenario::from_name(name) {
            Some(s) => vec![s],
            None => {
                eprintln!("Invalid testname: {name}");
                process::exit(1);
            }
        },
    };

    if scheduling.is_realtime() {
        for line in report::render_config(&config) {
            println!("{line}");
        }
    }

    for scenario in scenarios {
        let outcome = match drivers::run(scenario, &config) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} aborted: {e}", scenario.as_name());
                eprintln!("{}: {e}", scenario.as_name());
                process::exit(3);
            }
        };
        print_report(&outcome, args.format);
    }
}

fn print_report(outcome: &drivers::ScenarioReport, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for line in report::render_text(outcome) {
                println!("{line}");
            }
            if outcome.scenario == Scenario::WakeupSingle {
                println!();
            }
        }
        OutputFormat::Json => match report::render_json(outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to encode report: {e}");
                process::exit(3);
            }
        },
    }
}
