use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use qrprofile::{
    Error, ExportFormat, ExportOutcome, ExportSize, FileArtifact, FileSaver, Labels, Notifier,
    PREVIEW_WIDTH, PreviewOutcome, ProfileField, ProfileForm, QrDecoder, QrEncoder, QrPipeline,
    QrcodeEncoder, RasterSurface, RenderOptions, Result, SavedFile,
};

#[derive(Default)]
struct MemorySaver {
    saved: Mutex<Vec<FileArtifact>>,
}

impl MemorySaver {
    fn artifacts(&self) -> Vec<FileArtifact> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileSaver for MemorySaver {
    async fn save(&self, artifact: &FileArtifact) -> Result<SavedFile> {
        self.saved.lock().unwrap().push(artifact.clone());
        Ok(SavedFile {
            path: PathBuf::from(&artifact.file_name),
            bytes: artifact.data.len(),
        })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

/// Real encoder with a per-text delay, or a hard failure
struct ScriptedEncoder {
    inner: QrcodeEncoder,
    slow_marker: Option<&'static str>,
    fail: bool,
}

impl ScriptedEncoder {
    fn slow_on(marker: &'static str) -> Self {
        Self {
            inner: QrcodeEncoder::new(),
            slow_marker: Some(marker),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            inner: QrcodeEncoder::new(),
            slow_marker: None,
            fail: true,
        }
    }

    async fn delay(&self, text: &str) {
        let slow = self.slow_marker.is_some_and(|m| text.contains(m));
        let ms = if slow { 500 } else { 10 };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[async_trait]
impl QrEncoder for ScriptedEncoder {
    async fn encode_to_surface(
        &self,
        surface: &mut RasterSurface,
        text: &str,
        options: RenderOptions,
    ) -> Result<()> {
        if self.fail {
            return Err(Error::QrEncode("scripted failure".to_string()));
        }
        self.delay(text).await;
        self.inner.encode_to_surface(surface, text, options).await
    }

    async fn encode_to_string(&self, text: &str, options: RenderOptions) -> Result<String> {
        if self.fail {
            return Err(Error::QrEncode("scripted failure".to_string()));
        }
        self.delay(text).await;
        self.inner.encode_to_string(text, options).await
    }
}

struct Harness {
    form: ProfileForm,
    pipeline: QrPipeline,
    saver: Arc<MemorySaver>,
    notifier: Arc<RecordingNotifier>,
}

fn harness(encoder: Arc<dyn QrEncoder>, labels: Labels) -> Harness {
    let form = ProfileForm::new();
    let saver = Arc::new(MemorySaver::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = QrPipeline::new(
        form.subscribe(),
        encoder,
        saver.clone(),
        notifier.clone(),
        labels,
    );
    Harness {
        form,
        pipeline,
        saver,
        notifier,
    }
}

fn expected_preview(text: &str) -> RasterSurface {
    let mut surface = RasterSurface::new();
    surface.replace(
        QrcodeEncoder::new()
            .render_image(text, RenderOptions::with_width(PREVIEW_WIDTH))
            .expect("render expected preview"),
    );
    surface
}

#[tokio::test]
async fn empty_profile_renders_and_exports_nothing() {
    let h = harness(Arc::new(QrcodeEncoder::new()), Labels::arabic());

    assert!(!h.pipeline.has_data());
    assert_eq!(h.pipeline.refresh_preview().await, PreviewOutcome::Cleared);
    assert!(h.pipeline.preview().snapshot().is_cleared());

    assert_eq!(h.pipeline.export_png().await.unwrap(), ExportOutcome::Skipped);
    assert_eq!(h.pipeline.export_svg().await.unwrap(), ExportOutcome::Skipped);
    assert!(h.saver.artifacts().is_empty());
    assert_eq!(h.pipeline.blobs().created_count(), 0);

    assert!(matches!(
        h.pipeline.select_size(ExportSize::Large),
        Err(Error::SelectionDisabled)
    ));
    assert_eq!(h.pipeline.export_size(), ExportSize::Medium);
}

#[tokio::test]
async fn png_export_for_single_field_profile() {
    let labels = Labels::arabic();
    let h = harness(Arc::new(QrcodeEncoder::new()), labels.clone());

    h.form.update_field(ProfileField::FullName, "Sara");
    h.pipeline.select_size(ExportSize::Large).unwrap();

    let outcome = h.pipeline.export_png().await.unwrap();
    let saved = outcome.saved().expect("png saved");
    assert_eq!(saved.path, PathBuf::from("Sara_512.png"));

    let artifacts = h.saver.artifacts();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].mime, "image/png");

    let image = image::load_from_memory(&artifacts[0].data).expect("valid png");
    assert_eq!((image.width(), image.height()), (512, 512));

    let decoded = QrDecoder::new().decode(&image).expect("decodable png");
    let expected = format!(
        "{}: Sara\n{}: \n{}: \n{}: ",
        labels.name_key, labels.email_key, labels.phone_key, labels.bio_key
    );
    assert_eq!(decoded, expected);
    assert!(h.notifier.alerts().is_empty());
}

#[tokio::test]
async fn filled_profile_keeps_exact_export_and_preview_width() {
    let h = harness(Arc::new(QrcodeEncoder::new()), Labels::english());
    h.form.update_field(ProfileField::FullName, "Sara");
    h.form.update_field(ProfileField::Bio, "b".repeat(74));
    assert_eq!(h.pipeline.encoded_text().len(), 111);

    h.pipeline.select_size(ExportSize::Large).unwrap();
    let outcome = h.pipeline.export_png().await.unwrap();
    assert_eq!(
        outcome.saved().map(|s| s.path.clone()),
        Some(PathBuf::from("Sara_512.png"))
    );

    let artifacts = h.saver.artifacts();
    let image = image::load_from_memory(&artifacts[0].data).expect("valid png");
    assert_eq!((image.width(), image.height()), (512, 512));
    assert_eq!(
        QrDecoder::new().decode(&image).expect("decodable png"),
        h.pipeline.encoded_text()
    );

    assert_eq!(h.pipeline.refresh_preview().await, PreviewOutcome::Rendered);
    assert_eq!(h.pipeline.preview().snapshot().surface.width(), PREVIEW_WIDTH);
}

#[tokio::test]
async fn repeated_png_export_is_identical() {
    let h = harness(Arc::new(QrcodeEncoder::new()), Labels::english());
    h.form.update_field(ProfileField::FullName, "Ahmed  Ali");
    h.form.update_field(ProfileField::Email, "ahmed@example.com");

    h.pipeline.export_png().await.unwrap();
    h.pipeline.export_png().await.unwrap();

    let artifacts = h.saver.artifacts();
    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[0].file_name, "Ahmed_Ali_256.png");
    assert_eq!(artifacts[0], artifacts[1]);
}

#[tokio::test]
async fn svg_export_releases_object_url() {
    let h = harness(Arc::new(QrcodeEncoder::new()), Labels::english());
    h.form.update_field(ProfileField::Bio, "Frontend developer");
    h.pipeline.select_size(ExportSize::Small).unwrap();

    let outcome = h.pipeline.export(ExportFormat::Svg).await.unwrap();
    assert_eq!(
        outcome.saved().map(|s| s.path.clone()),
        Some(PathBuf::from("qrcode_128.svg"))
    );

    let artifacts = h.saver.artifacts();
    assert_eq!(artifacts[0].mime, "image/svg+xml");
    let markup = std::str::from_utf8(&artifacts[0].data).unwrap();
    assert!(markup.contains("width=\"128\" height=\"128\""));

    assert_eq!(h.pipeline.blobs().created_count(), 1);
    assert_eq!(h.pipeline.blobs().live_count(), 0);
}

#[tokio::test]
async fn svg_encode_failure_alerts_and_saves_nothing() {
    let labels = Labels::arabic();
    let h = harness(Arc::new(ScriptedEncoder::failing()), labels.clone());
    h.form.update_field(ProfileField::FullName, "Sara");

    assert_eq!(h.pipeline.export_svg().await.unwrap(), ExportOutcome::Aborted);
    assert_eq!(h.notifier.alerts(), vec![labels.export_failed.clone()]);
    assert!(h.saver.artifacts().is_empty());
    assert_eq!(h.pipeline.blobs().created_count(), 0);
}

#[tokio::test]
async fn oversized_profile_aborts_png_export() {
    let labels = Labels::english();
    let h = harness(Arc::new(QrcodeEncoder::new()), labels.clone());
    h.form.update_field(ProfileField::Bio, "a".repeat(4000));

    assert_eq!(h.pipeline.export_png().await.unwrap(), ExportOutcome::Aborted);
    assert_eq!(h.notifier.alerts(), vec![labels.export_failed]);
    assert!(h.saver.artifacts().is_empty());
}

#[tokio::test]
async fn export_size_does_not_touch_preview() {
    let h = harness(Arc::new(QrcodeEncoder::new()), Labels::english());
    h.form.update_field(ProfileField::Phone, "+966501234567");

    assert_eq!(h.pipeline.refresh_preview().await, PreviewOutcome::Rendered);
    let before = h.pipeline.preview().snapshot();

    h.pipeline.select_size(ExportSize::ExtraLarge).unwrap();
    assert_eq!(h.pipeline.preview().snapshot(), before);

    h.pipeline.refresh_preview().await;
    let after = h.pipeline.preview().snapshot();
    assert_eq!(after.surface, before.surface);
    assert_eq!(after.surface.width(), PREVIEW_WIDTH);
}

#[tokio::test(start_paused = true)]
async fn slow_render_cannot_overwrite_newer_render() {
    let h = harness(Arc::new(ScriptedEncoder::slow_on("slow")), Labels::english());
    let preview = h.pipeline.preview().clone();

    let older = preview.issue();
    let newer = preview.issue();

    let slow = {
        let preview = preview.clone();
        tokio::spawn(async move { preview.refresh_issued(older, "slow", true).await })
    };
    let fast = {
        let preview = preview.clone();
        tokio::spawn(async move { preview.refresh_issued(newer, "fast", true).await })
    };

    assert_eq!(fast.await.unwrap(), PreviewOutcome::Rendered);
    assert_eq!(slow.await.unwrap(), PreviewOutcome::Superseded);

    let snapshot = preview.snapshot();
    assert_eq!(snapshot.generation, newer);
    assert_eq!(snapshot.surface, expected_preview("fast"));
}

#[tokio::test(start_paused = true)]
async fn slow_render_cannot_overwrite_later_clear() {
    let h = harness(Arc::new(ScriptedEncoder::slow_on("Sara")), Labels::english());
    let preview = h.pipeline.preview().clone();

    let render = preview.issue();
    let clear = preview.issue();
    let slow = {
        let preview = preview.clone();
        tokio::spawn(async move { preview.refresh_issued(render, "Full Name: Sara", true).await })
    };

    assert_eq!(
        preview.refresh_issued(clear, "", false).await,
        PreviewOutcome::Cleared
    );
    assert_eq!(slow.await.unwrap(), PreviewOutcome::Superseded);
    assert!(preview.snapshot().is_cleared());
}

#[tokio::test(start_paused = true)]
async fn preview_task_tracks_latest_profile() {
    let h = harness(Arc::new(ScriptedEncoder::slow_on("slow")), Labels::english());
    let task = h.pipeline.spawn_preview_task();

    // Let the task pick up the initial (empty) record.
    tokio::time::sleep(Duration::from_millis(1)).await;

    h.form.update_field(ProfileField::FullName, "slow");
    tokio::time::sleep(Duration::from_millis(1)).await;
    h.form.update_field(ProfileField::FullName, "fast");

    tokio::time::sleep(Duration::from_secs(1)).await;

    let snapshot = h.pipeline.preview().snapshot();
    assert_eq!(h.pipeline.preview().issued(), 3);
    assert_eq!(snapshot.generation, 3);
    assert_eq!(snapshot.surface, expected_preview(&h.pipeline.encoded_text()));
    assert!(h.pipeline.encoded_text().starts_with("Full Name: fast"));

    h.form.update_field(ProfileField::FullName, "");
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(h.pipeline.preview().snapshot().is_cleared());

    drop(h.form);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn preview_task_renders_burst_of_updates_once() {
    let h = harness(Arc::new(QrcodeEncoder::new()), Labels::english());
    let task = h.pipeline.spawn_preview_task();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(h.pipeline.preview().issued(), 1);

    // No yield between updates: the task wakes once and sees the last record.
    h.form.update_field(ProfileField::FullName, "Sara");
    h.form.update_field(ProfileField::Email, "sara@example.com");
    h.form.update_field(ProfileField::Phone, "+966501234567");
    tokio::time::sleep(Duration::from_millis(1)).await;

    let snapshot = h.pipeline.preview().snapshot();
    assert_eq!(h.pipeline.preview().issued(), 2);
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.surface, expected_preview(&h.pipeline.encoded_text()));
    assert!(h.pipeline.encoded_text().contains("+966501234567"));

    drop(h.form);
    task.await.unwrap();
}
