// projeto: triaxial_prep
// file: src/main.rs
// Entry point: prepares split and windowed tensors for the LSTM trainer

use clap::Parser;
use chrono::Utc;
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use triaxial_prep::preprocessing::config::PipelineConfig;
use triaxial_prep::preprocessing::store::NpyStore;
use triaxial_prep::preprocessing::{
    load_train_stats, prepare_datasets, prepare_windows, save_artifacts, PrepError,
};

#[derive(Parser, Debug)]
#[command(
    name = "rnn-prep",
    version = "0.1.0",
    about = "Prepara dados de compressão triaxial para treinamento de LSTM",
    long_about = "Merges simulation conditions, splits samples into train/val/test, standardizes labels with train statistics and cuts sequences into sliding windows."
)]
struct Cli {
    /// Arquivo TOML de configuração
    #[arg(long)]
    config: Option<PathBuf>,

    /// Diretório do store ({pressure}e6/{type}/*.npy)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Diretório base de saída
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Pressão de confinamento (ex: 0.2e6) ou "All"
    #[arg(long)]
    pressure: Option<String>,

    /// Tipo de experimento (drained, undrained) ou "All"
    #[arg(long)]
    experiment_type: Option<String>,

    #[arg(long, help = "Seed for the split permutation and window shuffling")]
    seed: Option<u64>,

    #[arg(long, help = "Steps per window")]
    window_size: Option<usize>,

    #[arg(long, help = "Steps between window starts")]
    window_step: Option<usize>,

    #[arg(long, help = "Copies of the first timestep to prepend")]
    pad_length: Option<usize>,

    /// Append initial void ratio to the contact parameters
    #[arg(long)]
    add_e0: bool,

    /// Skip windowing, write only the split tensors
    #[arg(long)]
    no_windows: bool,

    /// Keep labels in physical units
    #[arg(long)]
    no_standardize: bool,

    /// List the conditions present in the store and exit
    #[arg(long)]
    list_conditions: bool,

    /// Print the train statistics saved in a model directory and exit
    #[arg(long)]
    inspect: Option<PathBuf>,

    /// Modo verboso de logging
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(pressure) = &self.pressure {
            config.pressure = pressure.clone();
        }
        if let Some(experiment_type) = &self.experiment_type {
            config.experiment_type = experiment_type.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(size) = self.window_size {
            config.window_size = size;
        }
        if let Some(step) = self.window_step {
            config.window_step = step;
        }
        if let Some(pad) = self.pad_length {
            config.pad_length = pad;
        }
        if self.add_e0 {
            config.add_e0 = true;
        }
        if self.no_windows {
            config.use_windows = false;
        }
        if self.no_standardize {
            config.standardize_outputs = false;
        }
    }
}

fn main() -> Result<(), PrepError> {
    let cli = Cli::parse();

    // Configurar logging
    setup_logging(cli.verbose);

    let start_time = Instant::now();
    info!("🚀 Preparação de dados iniciada em {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));

    match run(&cli) {
        Ok(_) => {
            info!("✅ Concluído em {:.2}s", start_time.elapsed().as_secs_f64());
        }
        Err(e) => {
            error!("❌ Erro durante a preparação: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_secs()
        .init();
}

fn run(cli: &Cli) -> Result<(), PrepError> {
    if let Some(dir) = &cli.inspect {
        return inspect(dir);
    }

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    let store = NpyStore::open(&config.data_dir)?;

    if cli.list_conditions {
        let conditions = store.conditions();
        if conditions.is_empty() {
            warn!("⚠️ Nenhuma condição encontrada em {}", store.root().display());
        }
        for condition in conditions {
            println!("{}", condition);
        }
        return Ok(());
    }

    info!("📊 Pressão: {} | Tipo: {} | Seed: {}", config.pressure, config.experiment_type, config.seed);

    let (split_data, stats) = prepare_datasets(&store, &config)?;
    let windows = if config.use_windows {
        Some(prepare_windows(&split_data, &config)?)
    } else {
        None
    };

    let model_dir = config.output_dir.join(config.run_name());
    save_artifacts(&model_dir, &split_data, windows.as_ref(), &stats)?;
    config.save(model_dir.join("prep_config.toml"))?;

    info!("📈 Resumo:");
    for (name, split) in split_data.iter() {
        match windows.as_ref().and_then(|w| w.get(&name)) {
            Some(w) => info!("   ├── {}: {} amostras → {} janelas", name, split.len(), w.len()),
            None => info!("   ├── {}: {} amostras", name, split.len()),
        }
    }
    info!("   └── Artefatos em {}", model_dir.display());

    Ok(())
}

fn inspect(dir: &std::path::Path) -> Result<(), PrepError> {
    let stats = load_train_stats(dir)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

// Exemplos de uso:
// cargo run --release -- --data-dir data/rnn_data --pressure All --experiment-type All
// cargo run --release -- --config prep.toml --window-size 20 --window-step 5 --verbose
// cargo run --release -- --pressure 0.5e6 --experiment-type undrained --pad-length 19 --add-e0
// cargo run --release -- --inspect trained_models/simple_rnn_All_All
