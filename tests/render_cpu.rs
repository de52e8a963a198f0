use skocko_anim::{
    assets::PreparedAssetStore,
    model::{Asset, ShapeAsset, ShapeSpec, ShapeStyle},
    render::{create_backend, BackendKind, RenderSettings},
    Anim, Canvas, ClipBuilder, CompositionBuilder, Composition, Fps, FrameIndex, FrameRange,
    Rgba8Premul, TrackBuilder, Transform2D,
};

fn centered_square_comp(side: f64) -> Composition {
    CompositionBuilder::new(
        Fps::new(30, 1).unwrap(),
        Canvas {
            width: 64,
            height: 64,
        },
        FrameIndex(2),
    )
    .asset(
        "sq",
        Asset::Shape(ShapeAsset {
            spec: ShapeSpec::Square { side },
            style: ShapeStyle::filled(),
        }),
    )
    .unwrap()
    .track(
        TrackBuilder::new("main")
            .clip(
                ClipBuilder::new(
                    "c0",
                    "sq",
                    FrameRange::new(FrameIndex(0), FrameIndex(2)).unwrap(),
                )
                .transform(Anim::constant(Transform2D::at(32.0, 32.0)))
                .color(Rgba8Premul::opaque(255, 0, 0))
                .build()
                .unwrap(),
            )
            .build()
            .unwrap(),
    )
    .build()
    .unwrap()
}

fn pixel(frame: &skocko_anim::FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn filled_square_covers_center_not_corners() {
    let comp = centered_square_comp(24.0);
    let assets = PreparedAssetStore::prepare(&comp, std::path::Path::new(".")).unwrap();
    let mut backend = create_backend(
        BackendKind::Cpu,
        &RenderSettings {
            clear_rgba: Some([0, 0, 0, 255]),
        },
    )
    .unwrap();

    let frame = skocko_anim::render_frame(&comp, FrameIndex(0), backend.as_mut(), &assets).unwrap();
    assert_eq!(frame.width, 64);
    assert_eq!(frame.height, 64);

    let center = pixel(&frame, 32, 32);
    assert!(center[0] > 200, "center should be red, got {center:?}");
    assert!(center[1] < 50 && center[2] < 50);

    let corner = pixel(&frame, 2, 2);
    assert_eq!(corner, [0, 0, 0, 255], "corner should be clear color");
}

#[test]
fn clear_color_reaches_uncovered_pixels() {
    let comp = centered_square_comp(24.0);
    let assets = PreparedAssetStore::prepare(&comp, std::path::Path::new(".")).unwrap();
    let mut backend = create_backend(
        BackendKind::Cpu,
        &RenderSettings {
            clear_rgba: Some([26, 26, 26, 255]),
        },
    )
    .unwrap();

    let frame = skocko_anim::render_frame(&comp, FrameIndex(0), backend.as_mut(), &assets).unwrap();
    assert_eq!(
        pixel(&frame, 2, 2),
        [26, 26, 26, 255],
        "background should show through where no clip is drawn"
    );
    let center = pixel(&frame, 32, 32);
    assert!(center[0] > 200, "square should still cover the center");
}

#[test]
fn transparent_clear_yields_transparent_corners() {
    let comp = centered_square_comp(24.0);
    let assets = PreparedAssetStore::prepare(&comp, std::path::Path::new(".")).unwrap();
    let mut backend =
        create_backend(BackendKind::Cpu, &RenderSettings { clear_rgba: None }).unwrap();

    let frame = skocko_anim::render_frame(&comp, FrameIndex(0), backend.as_mut(), &assets).unwrap();
    assert_eq!(pixel(&frame, 2, 2)[3], 0);
    assert!(frame.premultiplied);
}

#[test]
fn out_of_range_frame_is_an_error() {
    let comp = centered_square_comp(24.0);
    let assets = PreparedAssetStore::prepare(&comp, std::path::Path::new(".")).unwrap();
    let mut backend =
        create_backend(BackendKind::Cpu, &RenderSettings::default()).unwrap();

    assert!(
        skocko_anim::render_frame(&comp, FrameIndex(99), backend.as_mut(), &assets).is_err()
    );
}
