use photo_wall::layout::{CATALOG, resolve, validate_catalog};

const SCREENS: &[(i32, i32)] = &[(1920, 1080), (1080, 1920), (1280, 720), (800, 480), (3840, 2160), (1366, 768), (333, 777)];

#[test]
fn every_layout_stays_on_screen() {
    validate_catalog(CATALOG).unwrap();
    for &(w, h) in SCREENS {
        for (index, layout) in CATALOG.iter().enumerate() {
            for rect in resolve(layout, w, h) {
                assert!(rect.x >= 0 && rect.y >= 0, "layout {index} on {w}x{h}: {rect:?}");
                assert!(rect.w > 0 && rect.h > 0, "layout {index} on {w}x{h}: {rect:?}");
                assert!(rect.right() <= w + 1 && rect.bottom() <= h + 1, "layout {index} on {w}x{h}: {rect:?}");
            }
        }
    }
}

#[test]
fn neighbouring_slots_never_overlap() {
    for &(w, h) in SCREENS {
        for layout in CATALOG {
            let rects = resolve(layout, w, h);
            for (i, a) in rects.iter().enumerate() {
                for b in &rects[i + 1..] {
                    let disjoint = a.right() <= b.x || b.right() <= a.x || a.bottom() <= b.y || b.bottom() <= a.y;
                    assert!(disjoint, "{a:?} overlaps {b:?} on {w}x{h}");
                }
            }
        }
    }
}
