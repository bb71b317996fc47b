//! linfit CLI: train linear models on CSV files and predict with saved ones.

mod model;

use clap::{Parser, Subcommand, ValueEnum};
use linfit_core::Matrix;
use linfit_data::DataSource;
use linfit_io::{load_model, read_csv, save_model, write_csv, CsvDataset, CsvOptions, ModelKind};
use linfit_model::{ModelConfig, TrainParams};
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::model::TrainedModel;

#[derive(Parser)]
#[command(name = "linfit")]
#[command(about = "Gradient-descent linear regression, perceptron and linear SVM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModelArg {
    Linreg,
    Perceptron,
    Svm,
}

impl From<ModelArg> for ModelKind {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Linreg => ModelKind::LinearRegression,
            ModelArg::Perceptron => ModelKind::Perceptron,
            ModelArg::Svm => ModelKind::Svm,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model on a CSV file whose last column holds the labels
    Train {
        /// Model to train
        #[arg(value_enum)]
        model: ModelArg,

        /// Training data
        input: PathBuf,

        /// Optional validation data, same layout as the input
        test: Option<PathBuf>,

        /// The CSV files have no header row
        #[arg(long)]
        no_header: bool,

        /// Number of gradient-descent epochs
        #[arg(long, default_value_t = TrainParams::default().epochs)]
        epochs: usize,

        /// Learning rate
        #[arg(long, default_value_t = TrainParams::default().learning_rate)]
        lr: f64,

        /// Z-score the labels before training (regression only)
        #[arg(long)]
        normalize_labels: bool,

        /// Number of leading feature columns left unnormalized
        #[arg(long, default_value_t = 0)]
        start_norm: usize,

        /// Write the trained model to this JSON file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Predict with a saved model
    Predict {
        /// Model file written by `train --save`
        model_file: PathBuf,

        /// Rows to predict for
        input: PathBuf,

        /// The CSV file has no header row
        #[arg(long)]
        no_header: bool,

        /// Write predictions to this CSV file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Every column of the input is a feature (no label column)
        #[arg(long)]
        features_only: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Train {
            model,
            input,
            test,
            no_header,
            epochs,
            lr,
            normalize_labels,
            start_norm,
            save,
        } => {
            let config = ModelConfig::new()
                .with_label_normalization(normalize_labels)
                .with_start_norm(start_norm);
            cmd_train(
                model.into(),
                &input,
                test.as_deref(),
                CsvOptions { has_header: !no_header },
                config,
                TrainParams::new(epochs, lr),
                save.as_deref(),
            )
        }
        Commands::Predict {
            model_file,
            input,
            no_header,
            output,
            features_only,
        } => cmd_predict(
            &model_file,
            &input,
            CsvOptions { has_header: !no_header },
            output.as_deref(),
            features_only,
        ),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_dataset(path: &Path, options: CsvOptions) -> Result<CsvDataset, Box<dyn Error>> {
    let ds = CsvDataset::load(path, options);
    if !ds.is_good() {
        return Err(format!("could not load {}", path.display()).into());
    }
    Ok(ds)
}

fn cmd_train(
    kind: ModelKind,
    input: &Path,
    test: Option<&Path>,
    options: CsvOptions,
    config: ModelConfig,
    params: TrainParams,
    save: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    params.validate()?;
    let train_set = load_dataset(input, options)?;

    println!("Training {}", kind);
    println!("  samples:  {}", train_set.n_samples());
    println!("  features: {}", train_set.n_features());
    println!("  epochs:   {}", params.epochs);
    println!("  lr:       {}", params.learning_rate);

    let (model, history) = TrainedModel::fit(kind, &train_set, config, &params)?;
    drop(train_set);
    if let Some(loss) = history.final_loss() {
        println!("Final training loss: {:.6}", loss);
    }

    if let Some(test_path) = test {
        let test_set = load_dataset(test_path, options)?;
        println!("Validation on {} ({} samples)", test_path.display(), test_set.n_samples());
        for (name, value) in model.validate(&test_set)? {
            println!("  {:<18} {:.6}", name, value);
        }
    }

    if let Some(path) = save {
        save_model(&model.to_saved(), path)?;
        println!("Model saved to {}", path.display());
    }
    Ok(())
}

fn cmd_predict(
    model_file: &Path,
    input: &Path,
    options: CsvOptions,
    output: Option<&Path>,
    features_only: bool,
) -> Result<(), Box<dyn Error>> {
    let model = TrainedModel::from_saved(load_model(model_file)?)?;
    log::info!("loaded {} from {}", model.kind(), model_file.display());

    let predictions = if features_only {
        let features = read_csv(input, options.has_header)?;
        model.predict(&features)?
    } else {
        let ds = load_dataset(input, options)?;
        let predictions = model.predict(ds.features())?;
        for (name, value) in model.validate(&ds)? {
            log::info!("{}: {:.6}", name, value);
        }
        predictions
    };

    match output {
        Some(path) => {
            write_csv(path, &predictions, Some(&["prediction".to_string()][..]))?;
            println!("Wrote {} predictions to {}", predictions.rows(), path.display());
        }
        None => print_column(&predictions),
    }
    Ok(())
}

fn print_column(values: &Matrix<f64>) {
    for v in values.data() {
        println!("{}", v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use linfit_core::LinfitError;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("linfit-cli-{}-{}", std::process::id(), name))
    }

    /// Train `y = 2x + 1` on a headerless file and save the model next to it.
    fn trained_model_file(tag: &str) -> (PathBuf, PathBuf) {
        let train = temp_path(&format!("{}-train.csv", tag));
        fs::write(&train, "1,3\n2,5\n3,7\n4,9\n").unwrap();
        let model_path = temp_path(&format!("{}-model.json", tag));
        cmd_train(
            ModelKind::LinearRegression,
            &train,
            Some(&train),
            CsvOptions { has_header: false },
            ModelConfig::default(),
            TrainParams::new(500, 0.05),
            Some(&model_path),
        )
        .unwrap();
        (train, model_path)
    }

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["linfit", "train", "svm", "train.csv"]).unwrap();
        match cli.command {
            Commands::Train {
                model,
                test,
                no_header,
                epochs,
                lr,
                normalize_labels,
                start_norm,
                save,
                ..
            } => {
                assert_eq!(model, ModelArg::Svm);
                assert!(test.is_none());
                assert!(!no_header);
                assert_eq!(epochs, 20);
                assert_eq!(lr, 1e-3);
                assert!(!normalize_labels);
                assert_eq!(start_norm, 0);
                assert!(save.is_none());
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "linfit",
            "train",
            "linreg",
            "train.csv",
            "test.csv",
            "--no-header",
            "--epochs",
            "500",
            "--lr",
            "0.01",
            "--normalize-labels",
            "--start-norm",
            "28",
            "--save",
            "model.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Train {
                model,
                test,
                no_header,
                epochs,
                lr,
                normalize_labels,
                start_norm,
                save,
                ..
            } => {
                assert_eq!(ModelKind::from(model), ModelKind::LinearRegression);
                assert_eq!(test, Some(PathBuf::from("test.csv")));
                assert!(no_header);
                assert_eq!(epochs, 500);
                assert_eq!(lr, 0.01);
                assert!(normalize_labels);
                assert_eq!(start_norm, 28);
                assert_eq!(save, Some(PathBuf::from("model.json")));
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_unknown_model_rejected() {
        assert!(Cli::try_parse_from(["linfit", "train", "forest", "train.csv"]).is_err());
    }

    #[test]
    fn test_predict_args() {
        let cli = Cli::try_parse_from([
            "linfit",
            "predict",
            "model.json",
            "rows.csv",
            "--features-only",
            "-o",
            "out.csv",
        ])
        .unwrap();
        match cli.command {
            Commands::Predict {
                model_file,
                features_only,
                output,
                no_header,
                ..
            } => {
                assert_eq!(model_file, PathBuf::from("model.json"));
                assert!(features_only);
                assert!(!no_header);
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_missing_training_file_fails() {
        let missing = std::env::temp_dir().join("linfit-cli-missing.csv");
        let result = cmd_train(
            ModelKind::Svm,
            &missing,
            None,
            CsvOptions::default(),
            ModelConfig::default(),
            TrainParams::default(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_train_validates_and_saves() {
        let (train, model_path) = trained_model_file("save");
        let saved = load_model(&model_path).unwrap();
        assert_eq!(saved.kind, ModelKind::LinearRegression);
        assert_eq!(saved.state.weights.shape(), (2, 1));

        fs::remove_file(&train).ok();
        fs::remove_file(&model_path).ok();
    }

    #[test]
    fn test_invalid_params_fail_before_loading() {
        let missing = temp_path("never-read.csv");
        let result = cmd_train(
            ModelKind::Perceptron,
            &missing,
            None,
            CsvOptions::default(),
            ModelConfig::default(),
            TrainParams::new(0, 0.1),
            None,
        );
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LinfitError>(),
            Some(LinfitError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_predict_labelled_file_writes_predictions() {
        let (train, model_path) = trained_model_file("labelled");
        let out = temp_path("labelled-out.csv");

        cmd_predict(&model_path, &train, CsvOptions { has_header: false }, Some(&out), false)
            .unwrap();

        let predictions = read_csv(&out, true).unwrap();
        assert_eq!(predictions.shape(), (4, 1));
        for (p, y) in predictions.data().iter().zip([3.0, 5.0, 7.0, 9.0]) {
            assert_abs_diff_eq!(*p, y, epsilon = 1e-6);
        }

        for path in [&train, &model_path, &out] {
            fs::remove_file(path).ok();
        }
    }

    #[test]
    fn test_predict_features_only() {
        let (train, model_path) = trained_model_file("features");
        let rows = temp_path("features-rows.csv");
        fs::write(&rows, "5\n0\n").unwrap();
        let out = temp_path("features-out.csv");

        cmd_predict(&model_path, &rows, CsvOptions { has_header: false }, Some(&out), true)
            .unwrap();

        let predictions = read_csv(&out, true).unwrap();
        assert_eq!(predictions.shape(), (2, 1));
        assert_abs_diff_eq!(predictions.data()[0], 11.0, epsilon = 1e-6);
        assert_abs_diff_eq!(predictions.data()[1], 1.0, epsilon = 1e-6);

        for path in [&train, &model_path, &rows, &out] {
            fs::remove_file(path).ok();
        }
    }

    #[test]
    fn test_predict_rejects_wider_input() {
        let (train, model_path) = trained_model_file("wide");
        let rows = temp_path("wide-rows.csv");
        fs::write(&rows, "1,2,3\n").unwrap();
        let out = temp_path("wide-out.csv");

        let options = CsvOptions { has_header: false };
        let err = cmd_predict(&model_path, &rows, options, Some(&out), true).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LinfitError>(),
            Some(&LinfitError::UnregisteredColumn { column: 2 })
        );
        assert!(!out.exists());

        for path in [&train, &model_path, &rows] {
            fs::remove_file(path).ok();
        }
    }
}
