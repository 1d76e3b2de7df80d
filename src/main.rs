//! qrprofile command-line entrypoint

use clap::{Args, Parser, Subcommand, ValueEnum};
use qrprofile::output::{render_profile, terminal_art};
use qrprofile::{
    ConsoleNotifier, DirectorySaver, Error, ExportFormat, ExportOutcome, ExportSize, Labels,
    Locale, ProfileField, ProfileForm, ProfileQrConfig, ProfileRecord, QrDecoder, QrPipeline,
    QrcodeEncoder, Result, logging,
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Width of the terminal rendering of the preview, in characters
const ART_COLUMNS: u32 = 64;

#[derive(Parser, Debug)]
#[command(
    name = "qrprofile",
    version,
    about = "Turn a personal profile into a QR code and export it as PNG or SVG"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to qrprofile.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Label language (`ar` or `en`), overrides the configuration file
    #[arg(long, value_name = "LANG", global = true)]
    locale: Option<String>,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the given profile once and exit
    Export(ExportArgs),
    /// Fill the form interactively from stdin with a live preview
    Session(SessionArgs),
    /// Decode a profile QR image and print its fields
    Read {
        /// PNG/JPEG image containing the QR code
        image: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct ProfileArgs {
    /// Full name
    #[arg(long)]
    name: Option<String>,
    /// Email address
    #[arg(long)]
    email: Option<String>,
    /// Phone number
    #[arg(long)]
    phone: Option<String>,
    /// Short bio
    #[arg(long)]
    bio: Option<String>,
}

impl ProfileArgs {
    fn apply(&self, form: &ProfileForm) {
        let values = [
            (ProfileField::FullName, &self.name),
            (ProfileField::Email, &self.email),
            (ProfileField::Phone, &self.phone),
            (ProfileField::Bio, &self.bio),
        ];
        for (field, value) in values {
            if let Some(value) = value {
                form.update_field(field, value.as_str());
            }
        }
    }
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    profile: ProfileArgs,

    /// Export size: 128, 256, 512 or 1024
    #[arg(long, value_name = "PX")]
    size: Option<String>,

    /// Which files to produce
    #[arg(long, value_enum, default_value_t = FormatChoice::Both)]
    format: FormatChoice,

    /// Directory to save into (overrides configuration)
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Initial export size: 128, 256, 512 or 1024
    #[arg(long, value_name = "PX")]
    size: Option<String>,

    /// Directory to save into (overrides configuration)
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatChoice {
    Png,
    Svg,
    Both,
}

impl FormatChoice {
    fn formats(self) -> &'static [ExportFormat] {
        match self {
            FormatChoice::Png => &[ExportFormat::Png],
            FormatChoice::Svg => &[ExportFormat::Svg],
            FormatChoice::Both => &[ExportFormat::Png, ExportFormat::Svg],
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ProfileQrConfig::load(cli.config.as_deref())?;

    if let Some(ref locale) = cli.locale {
        config.locale.language = locale.parse::<Locale>().map_err(Error::Config)?;
    }

    match &cli.command {
        Command::Export(args) => {
            apply_export_overrides(&mut config, args.size.as_deref(), args.out_dir.as_deref())?
        }
        Command::Session(args) => {
            apply_export_overrides(&mut config, args.size.as_deref(), args.out_dir.as_deref())?
        }
        Command::Read { .. } => {}
    }

    logging::init(&config.logging)?;
    info!(locale = %config.locale.language, size = %config.export.size, "Starting qrprofile");

    match cli.command {
        Command::Export(args) => handle_export(&config, &args, cli.json).await,
        Command::Session(_) => handle_session(&config).await,
        Command::Read { image } => handle_read(&image, cli.json),
    }
}

fn apply_export_overrides(
    config: &mut ProfileQrConfig,
    size: Option<&str>,
    out_dir: Option<&Path>,
) -> Result<()> {
    if let Some(size) = size {
        config.export.size = size.parse::<ExportSize>()?;
    }
    if let Some(dir) = out_dir {
        config.export.output_dir = dir.to_path_buf();
    }
    Ok(())
}

fn build_pipeline(config: &ProfileQrConfig, form: &ProfileForm, labels: Labels) -> QrPipeline {
    QrPipeline::new(
        form.subscribe(),
        Arc::new(QrcodeEncoder::new()),
        Arc::new(DirectorySaver::new(&config.export.output_dir)),
        Arc::new(ConsoleNotifier),
        labels,
    )
    .with_export_size(config.export.size)
}

async fn handle_export(config: &ProfileQrConfig, args: &ExportArgs, json: bool) -> Result<()> {
    let labels = config.labels();
    let form = ProfileForm::new();
    args.profile.apply(&form);
    let pipeline = build_pipeline(config, &form, labels);

    if !pipeline.has_data() {
        eprintln!("{}", pipeline.labels().empty_placeholder);
    }

    let mut results = Vec::new();
    let mut aborted = false;
    for &format in args.format.formats() {
        let outcome = pipeline.export(format).await?;
        aborted |= outcome == ExportOutcome::Aborted;
        results.push((format, outcome));
    }

    if json {
        let entries: Vec<Value> = results
            .iter()
            .map(|(format, outcome)| outcome_value(*format, pipeline.export_size(), outcome))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (format, outcome) in &results {
            println!("{}", outcome_line(*format, outcome));
        }
    }

    if aborted {
        return Err(Error::QrEncode(
            "profile does not fit in a QR code, export aborted".to_string(),
        ));
    }
    Ok(())
}

async fn handle_session(config: &ProfileQrConfig) -> Result<()> {
    let labels = config.labels();
    let form = ProfileForm::new();
    let pipeline = build_pipeline(config, &form, labels);
    let preview_task = pipeline.spawn_preview_task();

    println!("Enter `field=value` (fields: fullName, email, phone, bio).");
    println!("Commands: :size <px>, :png, :svg, :show, :text, :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches('\r');
        match line.trim() {
            "" => continue,
            ":quit" | ":q" => break,
            ":png" => report_export(&pipeline, ExportFormat::Png).await?,
            ":svg" => report_export(&pipeline, ExportFormat::Svg).await?,
            ":text" => println!("{}", pipeline.encoded_text()),
            ":show" => show_preview(&pipeline),
            cmd if cmd.starts_with(":size") => {
                let arg = cmd.trim_start_matches(":size").trim();
                match arg.parse::<ExportSize>().and_then(|size| pipeline.select_size(size)) {
                    Ok(()) => println!(
                        "export size: {} ({})",
                        pipeline.export_size(),
                        pipeline.export_size().label(pipeline.labels())
                    ),
                    Err(err) => println!("{err}"),
                }
            }
            _ => match line.split_once('=') {
                Some((field, value)) => {
                    let value = value.replace("\\n", "\n");
                    if let Err(err) = form.handle_change(field.trim(), value) {
                        println!("{err}");
                    }
                }
                None => println!("Unrecognised input: {line}"),
            },
        }
    }

    drop(form);
    if let Err(err) = preview_task.await {
        tracing::warn!("Preview task ended abnormally: {err}");
    }
    Ok(())
}

async fn report_export(pipeline: &QrPipeline, format: ExportFormat) -> Result<()> {
    let outcome = pipeline.export(format).await?;
    println!("{}", outcome_line(format, &outcome));
    Ok(())
}

fn show_preview(pipeline: &QrPipeline) {
    let snapshot = pipeline.preview().snapshot();
    if snapshot.is_cleared() {
        println!("{}", pipeline.labels().empty_placeholder);
        return;
    }
    for row in terminal_art(&snapshot.surface, ART_COLUMNS) {
        println!("{row}");
    }
    println!(
        "preview {}x{} (generation {})",
        snapshot.surface.width(),
        snapshot.surface.height(),
        snapshot.generation
    );
}

fn handle_read(image: &Path, json: bool) -> Result<()> {
    let text = QrDecoder::new().decode_file(image)?;
    let (record, locale): (ProfileRecord, Locale) = ProfileRecord::parse_any_locale(&text)?;
    let rendered = render_profile(&record, &locale.labels());

    if json {
        let mut root = rendered.json;
        if let Some(obj) = root.as_object_mut() {
            obj.insert("locale".to_string(), json!(locale));
            obj.insert("text".to_string(), json!(text));
        }
        println!("{}", serde_json::to_string_pretty(&root)?);
    } else {
        println!("Profile QR ({locale}):");
        for line in &rendered.human {
            println!("{line}");
        }
    }
    Ok(())
}

fn outcome_line(format: ExportFormat, outcome: &ExportOutcome) -> String {
    match outcome {
        ExportOutcome::Skipped => format!("{format}: nothing to export"),
        ExportOutcome::Aborted => format!("{format}: export aborted"),
        ExportOutcome::Saved(saved) => format!(
            "{format}: saved {} ({} bytes)",
            saved.path.display(),
            saved.bytes
        ),
    }
}

fn outcome_value(format: ExportFormat, size: ExportSize, outcome: &ExportOutcome) -> Value {
    match outcome {
        ExportOutcome::Skipped => json!({ "format": format, "status": "skipped" }),
        ExportOutcome::Aborted => json!({ "format": format, "status": "aborted" }),
        ExportOutcome::Saved(saved) => json!({
            "format": format,
            "status": "saved",
            "size": size,
            "path": saved.path.display().to_string(),
            "bytes": saved.bytes,
        }),
    }
}
