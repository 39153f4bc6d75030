use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use petcare_booking::application::booking::{BookingSession, SubmitOutcome};
use petcare_booking::application::carousel::{Carousel, CarouselRotation};
use petcare_booking::config::AppConfig;
use petcare_booking::domain::money::Rupees;
use petcare_booking::domain::payment::PaymentOption;
use petcare_booking::domain::ports::{PaymentGatewayBox, VisitBackendBox};
use petcare_booking::domain::visit::{
    PlanRef, SubscribedPet, SubscriptionDetails, VisitPurposeDetails,
};
use petcare_booking::error::BookingError;
use petcare_booking::infrastructure::http::HttpVisitBackend;
use petcare_booking::infrastructure::in_memory::{InMemoryGateway, InMemoryVisitBackend};
use petcare_booking::infrastructure::razorpay::RazorpayGateway;
use petcare_booking::interfaces::console::checkout::ConsoleCheckout;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "PETCARE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Book a grooming visit
    Book(BookArgs),
    /// Rotate through the landing page slides
    Slides {
        /// Number of slide changes to print before exiting
        #[arg(long, default_value_t = 6)]
        ticks: usize,
        /// Override the rotation period from the config
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaymentArg {
    After,
    Full,
    Partial,
}

impl From<PaymentArg> for PaymentOption {
    fn from(arg: PaymentArg) -> Self {
        match arg {
            PaymentArg::After => PaymentOption::PayLater,
            PaymentArg::Full => PaymentOption::PayInFull,
            PaymentArg::Partial => PaymentOption::PayPartial,
        }
    }
}

#[derive(Args)]
struct BookArgs {
    #[arg(long)]
    pet_id: String,
    #[arg(long)]
    visit_type: String,
    /// List price of the visit in rupees
    #[arg(long)]
    price: Decimal,
    #[arg(long)]
    discount: Option<String>,
    /// Use a session from the pet's subscription
    #[arg(long)]
    use_subscription: bool,
    #[arg(long, value_enum)]
    payment: Option<PaymentArg>,
    /// Advance collected now for a partial payment
    #[arg(long)]
    advance: Option<Decimal>,
    /// Amount left for later on a partial payment
    #[arg(long)]
    remaining: Option<Decimal>,
    /// Use an in-memory backend and a gateway that approves every payment
    #[arg(long)]
    offline: bool,
    /// Sessions on the pet's subscription in offline mode
    #[arg(long, requires = "offline")]
    offline_sessions: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).into_diagnostic()?;

    match cli.command {
        Command::Book(args) => {
            let message = book(&config, args)
                .await
                .map_err(|e| miette!("{}", e.user_message()))?;
            println!("{message}");
        }
        Command::Slides { ticks, interval_ms } => {
            slides(&config, ticks, interval_ms).await.into_diagnostic()?;
        }
    }

    Ok(())
}

async fn book(config: &AppConfig, args: BookArgs) -> Result<String, BookingError> {
    let purpose = VisitPurposeDetails {
        id: args.visit_type.clone(),
        price: Rupees::new(args.price)?,
    };

    let (backend, gateway): (VisitBackendBox, PaymentGatewayBox) = if args.offline {
        let backend = InMemoryVisitBackend::new();
        if let Some(sessions) = args.offline_sessions {
            let details = SubscriptionDetails {
                remaining_sessions: sessions,
                plan: Some(PlanRef {
                    id: "offline-plan".to_string(),
                }),
                pet: Some(SubscribedPet {
                    name: args.pet_id.trim().to_string(),
                    owner: None,
                }),
            };
            backend
                .add_subscription(args.pet_id.trim(), args.visit_type.trim(), details)
                .await;
        }
        (Box::new(backend), Box::new(InMemoryGateway::approving()))
    } else {
        if config.razorpay_key_id.is_empty() {
            warn!("razorpay_key_id is not configured; checkout will not open");
        }
        (
            Box::new(HttpVisitBackend::new(config)),
            Box::new(RazorpayGateway::new(config, Box::new(ConsoleCheckout::stdin()))),
        )
    };

    let mut booking = BookingSession::new(args.pet_id.clone(), purpose.clone(), backend, gateway);
    match booking.load_subscription().await? {
        Some(details) => println!("{details}"),
        None => println!("No active subscription for Grooming"),
    }

    if let Some(discount) = &args.discount
        && !booking.set_discount(discount)?
    {
        return Err(BookingError::Validation(format!(
            "Discount must be between 0 and {}",
            purpose.price
        )));
    }
    if args.use_subscription {
        booking.toggle_subscription()?;
    }
    println!("Total amount: ₹{}", booking.final_price());
    if let Some(saved) = booking.savings() {
        println!("You save: ₹{saved}");
    }

    let mut outcome = booking.submit().await?;
    loop {
        outcome = match outcome {
            SubmitOutcome::Saved { message } => return Ok(message),
            SubmitOutcome::PaymentChoiceRequired { total } => {
                let option = args.payment.ok_or_else(|| {
                    BookingError::Validation(format!(
                        "₹{total} is due: choose --payment after, full or partial"
                    ))
                })?;
                booking.choose_payment(option.into()).await?
            }
            SubmitOutcome::PartialAmountsRequired { total, suggested } => {
                let advance = match args.advance {
                    Some(value) => Rupees::new(value)?,
                    None => suggested.advance(),
                };
                let remaining = match args.remaining {
                    Some(value) => Rupees::new(value)?,
                    None => total.saturating_sub(advance),
                };
                info!(%advance, %remaining, "partial payment split");
                booking.confirm_partial(advance, remaining).await?
            }
        };
    }
}

async fn slides(
    config: &AppConfig,
    ticks: usize,
    interval_ms: Option<u64>,
) -> Result<(), BookingError> {
    let period = match interval_ms {
        Some(0) => {
            return Err(BookingError::Validation(
                "--interval-ms must be greater than zero".to_string(),
            ));
        }
        Some(ms) => Duration::from_millis(ms),
        None => config.carousel.interval(),
    };

    let carousel = Carousel::new(config.carousel.slides.clone())?;
    let rotation = CarouselRotation::start(carousel, period);
    let mut changes = rotation.subscribe();

    let slide = rotation.current_slide();
    println!("[{}] {} ({})", rotation.current(), slide.image, slide.alt);
    for _ in 0..ticks {
        if changes.changed().await.is_err() {
            break;
        }
        let index = *changes.borrow_and_update();
        let slide = rotation.current_slide();
        println!("[{index}] {} ({})", slide.image, slide.alt);
    }
    Ok(())
}
