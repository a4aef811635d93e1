use image::{DynamicImage, Rgba, RgbaImage};
use mockup_canvas_core::editor::{
    CanvasEditor, ChangePhase, GestureState, ImageRole, Notice, TransformChange, UploadHandler,
};
use mockup_canvas_core::{
    AppError, Config, ExportFormat, ImageProcessor, ImageSource, Point, RelativePose, Result,
};
use std::cell::RefCell;
use std::rc::Rc;

const EPS: f64 = 1e-6;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn editor(width: u32, height: u32) -> CanvasEditor {
    let config = Config::builder().with_canvas_size(width, height).build().unwrap();
    CanvasEditor::new(config).unwrap()
}

fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([0, 128, 0, 255]));
    ImageProcessor::encode(&image, ExportFormat::Png).unwrap()
}

/// 800x600 canvas, 1600x800 background, 100x100 overlay.
fn wide_setup() -> CanvasEditor {
    let mut editor = editor(800, 600);
    editor
        .set_image(ImageRole::Background, &solid(1600, 800, [255, 255, 255, 255]))
        .unwrap();
    editor
        .set_image(ImageRole::Overlay, &solid(100, 100, [255, 0, 0, 255]))
        .unwrap();
    editor
}

fn record_changes(editor: &mut CanvasEditor) -> Rc<RefCell<Vec<TransformChange>>> {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = changes.clone();
    editor.on_transform_change(move |change| sink.borrow_mut().push(*change));
    changes
}

fn record_notices(editor: &mut CanvasEditor) -> Rc<RefCell<Vec<Notice>>> {
    let notices = Rc::new(RefCell::new(Vec::new()));
    let sink = notices.clone();
    editor.on_notify(move |notice| sink.borrow_mut().push(notice.clone()));
    notices
}

#[test]
fn test_letterbox_and_initial_pose() {
    let mut editor = wide_setup();
    let fit = editor.fit_bounds().unwrap();
    assert_eq!((fit.draw_width, fit.draw_height), (800.0, 400.0));
    assert_eq!((fit.offset_x, fit.offset_y), (0.0, 100.0));
    assert_eq!((fit.scale_x, fit.scale_y), (0.5, 0.5));

    editor.set_initial_transform(RelativePose {
        x: 400.0,
        y: 200.0,
        scale: 1.0,
        rotation: 0.0,
        opacity: 1.0,
    });
    let t = editor.transform();
    assert!(close(t.x, 200.0) && close(t.y, 200.0));
}

#[test]
fn test_drag_emits_live_then_committed() {
    let mut editor = wide_setup();
    let changes = record_changes(&mut editor);

    let state = editor.pointer_down(Point::new(400.0, 300.0));
    assert!(matches!(state, GestureState::Dragging { .. }));
    assert!(editor.selection_visible());

    let live = editor.pointer_move(Point::new(450.0, 320.0)).unwrap();
    assert_eq!(live.phase, ChangePhase::Live);
    assert_eq!((live.transform.x, live.transform.y), (450.0, 320.0));
    let relative = live.relative.unwrap();
    assert!(close(relative.x, 900.0) && close(relative.y, 440.0));

    let committed = editor.pointer_up().unwrap();
    assert_eq!(committed.phase, ChangePhase::Committed);
    assert_eq!(committed.transform, live.transform);
    assert!(editor.pointer_up().is_none());

    let changes = changes.borrow();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1].phase, ChangePhase::Committed);
}

#[test]
fn test_drag_is_rotation_invariant() {
    let mut editor = wide_setup();
    editor.set_position(Point::new(100.0, 100.0));
    editor.set_rotation(45.0);

    editor.pointer_down(Point::new(110.0, 105.0));
    let change = editor.pointer_move(Point::new(160.0, 85.0)).unwrap();
    assert_eq!((change.transform.x, change.transform.y), (150.0, 80.0));
    assert_eq!(change.transform.rotation, 45.0);
}

#[test]
fn test_resize_doubles_then_clamps() {
    let mut editor = wide_setup();
    let center = editor.transform().center();
    // Bottom-right corner handle sits 55px out on both axes
    let handle = Point::new(center.x + 55.0, center.y + 55.0);

    let state = editor.pointer_down(handle);
    assert!(matches!(state, GestureState::Resizing { .. }));

    let change = editor
        .pointer_move(Point::new(center.x + 110.0, center.y + 110.0))
        .unwrap();
    assert!(close(change.transform.scale, 2.0));

    let change = editor
        .pointer_move(Point::new(center.x + 550.0, center.y + 550.0))
        .unwrap();
    assert_eq!(change.transform.scale, 3.0);
}

#[test]
fn test_relative_is_none_without_background() {
    let mut editor = editor(800, 600);
    editor
        .set_image(ImageRole::Overlay, &solid(100, 100, [255, 0, 0, 255]))
        .unwrap();

    editor.pointer_down(Point::new(400.0, 300.0));
    let change = editor.pointer_move(Point::new(410.0, 300.0)).unwrap();
    assert!(change.relative.is_none());
    assert!(change.fit.is_none());
    assert!(editor.placement().is_none());
}

#[test]
fn test_initial_pose_waits_for_background() {
    let mut editor = editor(800, 600);
    editor
        .set_image(ImageRole::Overlay, &solid(100, 100, [255, 0, 0, 255]))
        .unwrap();
    editor.set_initial_transform(RelativePose {
        x: 400.0,
        y: 200.0,
        scale: 0.5,
        rotation: 30.0,
        opacity: 0.8,
    });
    assert_eq!(editor.transform().center(), Point::new(400.0, 300.0));

    editor
        .set_image(ImageRole::Background, &solid(1600, 800, [255, 255, 255, 255]))
        .unwrap();
    let t = editor.transform();
    assert!(close(t.x, 200.0) && close(t.y, 200.0));
    assert_eq!((t.scale, t.rotation, t.opacity), (0.5, 30.0, 0.8));
}

#[test]
fn test_async_background_applies_pending_pose() {
    let mut editor = editor(800, 600);
    editor.set_initial_transform(RelativePose {
        x: 10.0,
        y: 10.0,
        scale: 1.0,
        rotation: 0.0,
        opacity: 1.0,
    });
    editor.load_image(ImageRole::Background, ImageSource::Bytes(png(40, 30)));
    assert!(editor.is_loading());

    editor.wait_for(ImageRole::Background).unwrap();
    assert!(!editor.is_loading());
    assert!(editor.has_image(ImageRole::Background));

    // 40x30 fills the 800x600 canvas at 20x
    let t = editor.transform();
    assert!(close(t.x, 200.0) && close(t.y, 200.0));
}

#[test]
fn test_superseded_load_is_ignored() {
    let mut editor = editor(800, 600);
    editor.load_image(ImageRole::Background, ImageSource::Bytes(png(40, 30)));
    editor
        .set_image(ImageRole::Background, &solid(1600, 800, [255, 255, 255, 255]))
        .unwrap();

    std::thread::sleep(std::time::Duration::from_millis(200));
    assert_eq!(editor.poll(), 0);
    assert_eq!(editor.fit_bounds().unwrap().scale_x, 0.5);
}

#[test]
fn test_decode_failure_notifies_and_falls_back() {
    let mut editor = wide_setup();
    let notices = record_notices(&mut editor);

    editor
        .upload(ImageRole::Overlay, b"not an image".to_vec(), None)
        .unwrap();
    assert!(editor.wait_for(ImageRole::Overlay).is_err());

    let notices = notices.borrow();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].role, ImageRole::Overlay);
    assert!(!editor.has_image(ImageRole::Overlay));

    // A missing overlay is never hit
    assert_eq!(editor.pointer_down(Point::new(400.0, 300.0)), GestureState::Idle);
}

#[test]
fn test_background_failure_shows_placeholder() {
    let mut editor = wide_setup();
    let notices = record_notices(&mut editor);

    editor.load_image(ImageRole::Background, ImageSource::Bytes(b"junk".to_vec()));
    assert!(editor.wait_for(ImageRole::Background).is_err());
    assert_eq!(notices.borrow().len(), 1);
    assert!(editor.fit_bounds().is_none());
    assert!(editor.relative_pose().is_none());
}

#[test]
fn test_upload_validation() {
    let mut editor = editor(800, 600);
    let result = editor.upload(ImageRole::Overlay, png(4, 4), Some("logo.gif"));
    assert!(matches!(result, Err(AppError::ImageDecode(_))));

    let config = Config::builder().with_max_upload_bytes(16).build().unwrap();
    let mut small = CanvasEditor::new(config).unwrap();
    let result = small.upload(ImageRole::Overlay, png(4, 4), Some("logo.png"));
    assert!(matches!(result, Err(AppError::FileTooLarge { max: 16, .. })));
}

struct Recorder(Rc<RefCell<Vec<(ImageRole, usize, Option<String>)>>>);

impl UploadHandler for Recorder {
    fn upload(&mut self, role: ImageRole, bytes: &[u8], file_name: Option<&str>) -> Result<()> {
        self.0
            .borrow_mut()
            .push((role, bytes.len(), file_name.map(str::to_string)));
        Ok(())
    }
}

#[test]
fn test_upload_is_forwarded_then_decoded() {
    let mut editor = editor(800, 600);
    let uploads = Rc::new(RefCell::new(Vec::new()));
    editor.set_upload_handler(Box::new(Recorder(uploads.clone())));

    let bytes = png(20, 10);
    let len = bytes.len();
    editor
        .upload(ImageRole::Background, bytes, Some("shirt.png"))
        .unwrap();
    editor.wait_for(ImageRole::Background).unwrap();

    assert_eq!(
        uploads.borrow().as_slice(),
        &[(ImageRole::Background, len, Some("shirt.png".to_string()))]
    );
    assert!(editor.fit_bounds().is_some());
}

#[test]
fn test_setters_clamp_and_commit() {
    let mut editor = wide_setup();
    let changes = record_changes(&mut editor);

    assert_eq!(editor.set_scale(10.0).transform.scale, 3.0);
    assert_eq!(editor.set_opacity(-1.0).transform.opacity, 0.0);
    assert_eq!(editor.set_scale(f64::NAN).transform.scale, 3.0);
    assert!(changes
        .borrow()
        .iter()
        .all(|c| c.phase == ChangePhase::Committed));

    let reset = editor.reset();
    assert_eq!(reset.transform.center(), Point::new(400.0, 300.0));
    assert_eq!((reset.transform.scale, reset.transform.opacity), (1.0, 1.0));
}

#[test]
fn test_placement_normalizes_rotation() {
    let mut editor = wide_setup();
    editor.set_rotation(-90.0);
    assert_eq!(editor.transform().rotation, -90.0);

    let placement = editor.placement().unwrap();
    assert!(close(placement.logo_rotation, 270.0));
    // 100px overlay at half scale spans 200 background pixels
    assert!(close(placement.marking_zone_w, 200.0));
    assert!(close(placement.marking_zone_x, 700.0));
    assert!(close(placement.marking_zone_y, 300.0));
}

#[test]
fn test_resize_canvas_keeps_relative_pose() {
    let mut editor = wide_setup();
    editor.set_position(Point::new(300.0, 250.0));
    let before = editor.relative_pose().unwrap();
    assert!(close(before.x, 600.0) && close(before.y, 300.0));

    editor.resize_canvas(400, 400).unwrap();
    assert_eq!(editor.canvas_size(), (400, 400));
    assert_eq!(editor.pixmap().width(), 400);

    let t = editor.transform();
    assert!(close(t.x, 150.0) && close(t.y, 175.0));
    let after = editor.relative_pose().unwrap();
    assert!(close(after.x, before.x) && close(after.y, before.y));
}

#[test]
fn test_export_omits_selection() {
    let mut editor = editor(800, 600);
    editor
        .set_image(ImageRole::Background, &solid(800, 600, [0, 0, 0, 255]))
        .unwrap();
    editor
        .set_image(ImageRole::Overlay, &solid(100, 100, [255, 0, 0, 255]))
        .unwrap();
    editor.pointer_down(Point::new(400.0, 300.0));
    editor.pointer_up();
    assert!(editor.selection_visible());

    // Rotation handle sits 30px above the top edge
    assert!(editor.render());
    let handle = editor.pixmap().pixel(400, 220).unwrap();
    assert!(handle.red() > 200 && handle.green() > 200);

    let exported = editor.export_rgba();
    assert_eq!(exported.get_pixel(400, 220).0, [0, 0, 0, 255]);
    let center = exported.get_pixel(400, 300).0;
    assert!(center[0] > 240 && center[1] < 20);

    // The interactive frame comes back on the next render
    assert!(editor.render());
    assert!(!editor.render());
}

#[test]
fn test_export_encodings() {
    let mut editor = wide_setup();
    let jpeg = editor.export_still_image(ExportFormat::Jpeg).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    let url = editor.export_data_url(ExportFormat::Png).unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
}
