use std::fmt::Write as _;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ward_client::HttpBedApi;
use ward_core::{
    BedId, Board, BoardConfig, BoardController, Intent, MutationOutcome, OccupancySummary,
    PatientId, Reconciler, RefreshOutcome, VacantStatus,
};

#[derive(Parser)]
#[command(name = "ward")]
#[command(about = "Hospital ward bed board CLI")]
struct Cli {
    /// Ward API base URL (overrides WARD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every ward with its beds
    Wards,
    /// List patients waiting for a bed
    Pool,
    /// Place an unassigned patient in a bed
    Assign {
        /// Patient ID
        patient: PatientId,
        /// Bed ID
        bed: BedId,
    },
    /// Return a bed's occupant to the unassigned pool
    Unassign {
        /// Bed ID
        bed: BedId,
    },
    /// Set a vacant bed's status
    Status {
        /// Bed ID
        bed: BedId,
        /// available, maintenance, cleaning or reserved
        status: VacantStatus,
    },
    /// Keep the board in sync and print occupancy until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("ward=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'ward --help' for commands");
        return Ok(());
    };

    let mut cfg = BoardConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        cfg = cfg.with_api_base_url(url)?;
    }
    let controller = BoardController::new(Arc::new(HttpBedApi::new(cfg.clone())?));

    match command {
        Commands::Wards => {
            controller.load().await?;
            print!("{}", controller.read(render_wards));
        }
        Commands::Pool => {
            controller.load().await?;
            print!("{}", controller.read(render_pool));
        }
        Commands::Assign { patient, bed } => {
            run_mutation(
                &controller,
                Intent::AssignPatientToBed {
                    patient_id: patient,
                    bed_id: bed,
                },
            )
            .await?;
        }
        Commands::Unassign { bed } => {
            run_mutation(&controller, Intent::UnassignBed { bed_id: bed }).await?;
        }
        Commands::Status { bed, status } => {
            run_mutation(
                &controller,
                Intent::ChangeBedStatus {
                    bed_id: bed,
                    new_status: status,
                },
            )
            .await?;
        }
        Commands::Watch => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = shutdown_tx.send(true);
                }
            });

            println!("Watching {} (Ctrl-C to stop)", cfg.api_base_url());
            Reconciler::new(controller, &cfg)
                .run(shutdown_rx, |outcome, board| {
                    if outcome == RefreshOutcome::Applied {
                        print!("{}", render_occupancy(&board.occupancy()));
                    }
                })
                .await;
        }
    }

    Ok(())
}

async fn run_mutation(
    controller: &BoardController<HttpBedApi>,
    intent: Intent,
) -> anyhow::Result<()> {
    controller.load().await?;
    match controller.dispatch(intent).await {
        MutationOutcome::Confirmed { intent } => {
            println!("Done: {intent}");
            Ok(())
        }
        MutationOutcome::RolledBack { alert, .. } => anyhow::bail!(alert),
        MutationOutcome::Ignored { reason: Some(reason) } => {
            anyhow::bail!("Not sent: {reason}")
        }
        MutationOutcome::Ignored { reason: None } => Ok(()),
    }
}

fn render_wards(board: &Board) -> String {
    let mut out = String::new();
    for ward in board.wards() {
        let occupied = ward.beds.iter().filter(|b| b.occupant().is_some()).count();
        let _ = writeln!(
            out,
            "{} [ward {}] floor {}, {}/{} occupied",
            ward.name, ward.id, ward.floor, occupied, ward.capacity
        );
        for bed in &ward.beds {
            let occupant = bed
                .occupant()
                .map(|p| format!("{} (patient {})", p.display_name(), p.id))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {:>5}  {:<8} {:<12} {}",
                bed.id.get(),
                bed.bed_number.as_str(),
                bed.status().as_str(),
                occupant
            );
        }
    }
    trim_line_ends(out)
}

fn render_pool(board: &Board) -> String {
    if board.pool().is_empty() {
        return "No patients waiting for a bed.\n".into();
    }
    let mut out = String::new();
    for patient in board.pool() {
        let _ = writeln!(out, "{:>5}  {}", patient.id.get(), patient.display_name());
    }
    out
}

fn render_occupancy(summaries: &[OccupancySummary]) -> String {
    let mut out = String::new();
    for s in summaries {
        let _ = writeln!(
            out,
            "{}: {}/{} occupied ({:.0}%), {} available, {} cleaning, {} maintenance, {} reserved",
            s.ward_name,
            s.occupied,
            s.capacity,
            s.occupancy_rate() * 100.0,
            s.available,
            s.cleaning,
            s.maintenance,
            s.reserved
        );
    }
    out
}

fn trim_line_ends(text: String) -> String {
    text.lines().map(|l| format!("{}\n", l.trim_end())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ward_core::{Bed, BedState, NonEmptyText, Patient, Ward, WardId};

    fn board() -> Board {
        let bed = |id: u64, number: &str, state: BedState| Bed {
            id: BedId::new(id),
            bed_number: NonEmptyText::new(number).expect("bed number should be valid"),
            state,
        };
        let ward = Ward {
            id: WardId::new(1),
            name: NonEmptyText::new("General Medicine").expect("ward name should be valid"),
            floor: 2,
            capacity: 4,
            beds: vec![
                bed(3, "GM-01", BedState::Available),
                bed(4, "GM-02", BedState::Occupied(Patient::new(9, "Bo", "Chen"))),
                bed(5, "GM-03", BedState::Cleaning),
            ],
        };
        Board::new(vec![ward], vec![Patient::new(7, "Ann", "Lee")])
    }

    #[test]
    fn test_render_wards_shows_occupant() {
        let text = render_wards(&board());
        assert!(text.starts_with("General Medicine [ward 1] floor 2, 1/4 occupied\n"));
        assert!(text.contains("GM-02    occupied     Bo Chen (patient 9)\n"));
        assert!(text.contains("GM-03    cleaning\n"));
    }

    #[test]
    fn test_render_pool_lists_waiting_patients() {
        assert_eq!(render_pool(&board()), "    7  Ann Lee\n");
        assert_eq!(
            render_pool(&Board::default()),
            "No patients waiting for a bed.\n"
        );
    }

    #[test]
    fn test_render_occupancy_line() {
        let text = render_occupancy(&board().occupancy());
        assert_eq!(
            text,
            "General Medicine: 1/4 occupied (25%), 1 available, 1 cleaning, 0 maintenance, 0 reserved\n"
        );
    }

    #[test]
    fn test_cli_parses_status_command() {
        let cli = Cli::try_parse_from(["ward", "--api-url", "http://ward:3000", "status", "5", "Cleaning"])
            .expect("command line should parse");
        assert_eq!(cli.api_url.as_deref(), Some("http://ward:3000"));
        match cli.command {
            Some(Commands::Status { bed, status }) => {
                assert_eq!(bed, BedId::new(5));
                assert_eq!(status, VacantStatus::Cleaning);
            }
            _ => panic!("expected status command"),
        }
    }

    #[test]
    fn test_cli_rejects_occupied_status_and_zero_id() {
        assert!(Cli::try_parse_from(["ward", "status", "5", "occupied"]).is_err());
        assert!(Cli::try_parse_from(["ward", "unassign", "0"]).is_err());
    }
}
