//! Fill in a profile, export it in both formats and read the PNG back
//!
//! Usage: cargo run --example profile_card

use qrprofile::{
    ConsoleNotifier, DirectorySaver, ExportSize, Labels, ProfileField, ProfileForm, QrDecoder,
    QrPipeline, QrcodeEncoder,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let form = ProfileForm::new();
    let pipeline = QrPipeline::new(
        form.subscribe(),
        Arc::new(QrcodeEncoder::new()),
        Arc::new(DirectorySaver::new("qr_output")),
        Arc::new(ConsoleNotifier),
        Labels::arabic(),
    );

    form.update_field(ProfileField::FullName, "أحمد عبدالله");
    form.update_field(ProfileField::Email, "example@email.com");
    form.update_field(ProfileField::Phone, "+966501234567");
    form.update_field(ProfileField::Bio, "مطور واجهات أمامية متخصص في React");

    pipeline.refresh_preview().await;
    println!("Preview ready at {}px", pipeline.preview().snapshot().surface.width());

    pipeline.select_size(ExportSize::Large)?;
    let png = pipeline.export_png().await?;
    let svg = pipeline.export_svg().await?;

    for saved in [png.saved(), svg.saved()].into_iter().flatten() {
        println!("✓ Saved {} ({} bytes)", saved.path.display(), saved.bytes);
    }

    if let Some(saved) = png.saved() {
        let text = QrDecoder::new().decode_file(&saved.path)?;
        println!("Decoded back:\n{text}");
    }

    Ok(())
}
