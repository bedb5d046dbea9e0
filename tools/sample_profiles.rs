//! Sample Profile Generator
//!
//! Prints random customer profiles as JSON lines, for feeding the predictor
//! with `--profile -` during smoke tests.

use churn_predictor::types::{
    ContractType, CustomerProfile, Gender, InternetService, PaymentMethod, YesNo,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Generate random telecom customer profiles
#[derive(Debug, Parser)]
#[command(name = "sample-profiles")]
struct Args {
    /// Number of profiles to print
    #[arg(long, default_value_t = 10)]
    count: u64,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Share of long-tenure, low-risk customers
    #[arg(long, default_value_t = 0.5)]
    loyal_rate: f64,
}

/// Profile generator for testing
struct ProfileGenerator {
    rng: StdRng,
}

impl ProfileGenerator {
    fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Long contract, automatic payment, several add-on services
    fn generate_loyal(&mut self) -> CustomerProfile {
        let tenure_months = self.rng.gen_range(24..72);
        let monthly_charges: f64 = self.rng.gen_range(40.0..110.0);

        CustomerProfile {
            tenure_months,
            monthly_charges: round_cents(monthly_charges),
            total_charges: round_cents(monthly_charges * f64::from(tenure_months)),
            contract_type: self.pick(&[ContractType::OneYear, ContractType::TwoYear]),
            payment_method: self.pick(&[PaymentMethod::BankTransfer, PaymentMethod::CreditCard]),
            internet_service: self.pick(&InternetService::ALL),
            online_security: self.yes_no(0.6),
            tech_support: self.yes_no(0.6),
            partner: self.yes_no(0.7),
            dependents: self.yes_no(0.4),
            ..self.generate_common()
        }
    }

    /// New month-to-month customer on fiber paying by electronic check
    fn generate_at_risk(&mut self) -> CustomerProfile {
        let tenure_months = self.rng.gen_range(0..12);
        let monthly_charges: f64 = self.rng.gen_range(70.0..120.0);

        CustomerProfile {
            tenure_months,
            monthly_charges: round_cents(monthly_charges),
            total_charges: round_cents(monthly_charges * f64::from(tenure_months)),
            contract_type: ContractType::MonthToMonth,
            payment_method: PaymentMethod::ElectronicCheck,
            internet_service: InternetService::FiberOptic,
            online_security: YesNo::No,
            tech_support: YesNo::No,
            partner: self.yes_no(0.3),
            dependents: self.yes_no(0.1),
            ..self.generate_common()
        }
    }

    fn generate_common(&mut self) -> CustomerProfile {
        CustomerProfile {
            gender: self.pick(&Gender::ALL),
            senior_citizen: u8::from(self.rng.gen_bool(0.16)),
            phone_service: self.yes_no(0.9),
            multiple_lines: self.yes_no(0.4),
            online_backup: self.yes_no(0.35),
            device_protection: self.yes_no(0.35),
            streaming_tv: self.yes_no(0.4),
            streaming_movies: self.yes_no(0.4),
            paperless_billing: self.yes_no(0.6),
            ..CustomerProfile::default()
        }
    }

    fn yes_no(&mut self, p: f64) -> YesNo {
        YesNo::from(self.rng.gen_bool(p))
    }

    fn pick<T: Copy>(&mut self, choices: &[T]) -> T {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_profiles=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    anyhow::ensure!(
        (0.0..=1.0).contains(&args.loyal_rate),
        "--loyal-rate must be between 0 and 1"
    );

    info!(
        count = args.count,
        seed = ?args.seed,
        loyal_rate = args.loyal_rate,
        "Generating sample profiles"
    );

    let mut generator = ProfileGenerator::new(args.seed);
    let mut loyal_count = 0;

    for _ in 0..args.count {
        let profile = if generator.rng.gen_bool(args.loyal_rate) {
            loyal_count += 1;
            generator.generate_loyal()
        } else {
            generator.generate_at_risk()
        };

        println!("{}", serde_json::to_string(&profile)?);
    }

    info!(
        "Completed! Generated {} profiles ({} loyal, {} at risk)",
        args.count,
        loyal_count,
        args.count - loyal_count
    );

    Ok(())
}
