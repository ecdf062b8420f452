//! Money Hunter entry point
//!
//! Native builds run a headless session driven by a simple bot and log how
//! it went. The browser build is a library; the page constructs `WebGame`.
//!
//! Usage: `money-hunter [config.json] [--seed N] [--seconds S]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::Context;
    use clap::Parser;

    use money_hunter::consts::SIM_DT;
    use money_hunter::platform::headless::HeadlessGame;
    use money_hunter::settings::LaunchConfig;
    use money_hunter::sim::SessionPhase;

    #[derive(Parser, Debug)]
    #[command(name = "money-hunter", about = "Play Money Hunter headless with a bot")]
    pub struct Args {
        /// JSON launch config: { "tuning": {...}, "settings": {...} }
        pub config: Option<PathBuf>,

        /// RNG seed (random if omitted)
        #[arg(long)]
        pub seed: Option<u64>,

        /// Simulated seconds to play
        #[arg(long, default_value_t = 120.0, value_parser = parse_seconds)]
        pub seconds: f32,
    }

    fn parse_seconds(s: &str) -> Result<f32, String> {
        let seconds: f32 = s.parse().map_err(|e| format!("{e}"))?;
        if seconds > 0.0 && seconds.is_finite() {
            Ok(seconds)
        } else {
            Err(format!("must be a positive number of seconds, got {seconds}"))
        }
    }

    pub fn load_config(path: &Path) -> anyhow::Result<LaunchConfig> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        LaunchConfig::from_json(&json)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn run() -> anyhow::Result<()> {
        env_logger::init();
        let args = Args::parse();

        let config = match &args.config {
            Some(path) => load_config(path)?,
            None => LaunchConfig::default(),
        };
        let seed = args.seed.unwrap_or_else(money_hunter::random_seed);

        log::info!("Money Hunter (headless) seed {} for {}s", seed, args.seconds);

        let mut game = HeadlessGame::new(seed, config.tuning, &config.settings);
        let steps = (args.seconds / SIM_DT).ceil() as u64;
        let mut runs = 1;
        let mut last_phase = game.state.phase();

        for _ in 0..steps {
            if let Some(point) = game.autopilot() {
                game.tap(point);
            }
            game.step(SIM_DT);

            let phase = game.state.phase();
            if phase != last_phase {
                if phase == SessionPhase::Running {
                    runs += 1;
                }
                last_phase = phase;
            }
        }

        log::info!(
            "{} run(s), current score {}, highest score {}",
            runs,
            game.state.score(),
            game.state.highest_score()
        );
        println!(
            "runs={} score={} highest={}",
            runs,
            game.state.score(),
            game.state.highest_score()
        );
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_args_defaults() {
            let args = Args::try_parse_from(["money-hunter"]).unwrap();
            assert!(args.config.is_none());
            assert!(args.seed.is_none());
            assert_eq!(args.seconds, 120.0);
        }

        #[test]
        fn test_args_full() {
            let argv = ["money-hunter", "cfg.json", "--seed", "7", "--seconds", "30"];
            let args = Args::try_parse_from(argv).unwrap();
            assert_eq!(args.config, Some(PathBuf::from("cfg.json")));
            assert_eq!(args.seed, Some(7));
            assert_eq!(args.seconds, 30.0);
        }

        #[test]
        fn test_bad_args_are_rejected() {
            assert!(Args::try_parse_from(["money-hunter", "--seed", "abc"]).is_err());
            assert!(Args::try_parse_from(["money-hunter", "--seconds", "-5"]).is_err());
            assert!(Args::try_parse_from(["money-hunter", "--seconds", "NaN"]).is_err());
        }

        #[test]
        fn test_missing_config_names_path() {
            let err = load_config(Path::new("/nonexistent/money-hunter.json")).unwrap_err();
            assert!(format!("{err}").contains("/nonexistent/money-hunter.json"));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry point is `WebGame`, this is just to satisfy the compiler
}
