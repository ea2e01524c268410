use std::fs;

use scenegen::annotations::{
    export_kitti, AnnotationBox, AnnotationStore, Annotations, Extra, JsonDirStore, Segmentation,
};
use scenegen::Error;

fn sample() -> Annotations {
    Annotations {
        boxes: vec![AnnotationBox {
            label: "car".into(),
            center: [5.0, -8.0, 0.8],
            size: [4.5, 1.8, 1.4],
            rotation: 0.0,
            extra: Extra::new(),
        }],
        segmentations: vec![
            Segmentation {
                label: "road_surface".into(),
                points: (0..4).map(serde_json::Value::from).collect(),
                extra: Extra::new(),
            },
            Segmentation {
                label: "building".into(),
                points: vec![10.into(), 11.into()],
                extra: Extra::new(),
            },
        ],
        ..Default::default()
    }
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonDirStore::new(dir.path().join("annotations"));

    let receipt = store.save("demo", &sample()).unwrap();
    assert_eq!(receipt.status, "saved");
    assert_eq!(receipt.stats.boxes, 1);
    assert_eq!(receipt.stats.segmented_points, 6);

    let back = store.load("demo").unwrap();
    assert_eq!(back.boxes, sample().boxes);
    assert_eq!(back.segmentations, sample().segmentations);
    assert_eq!(back.metadata.version, "1.0");
    assert_eq!(back.metadata.saved_at, Some(receipt.saved_at));
    assert_eq!(back.metadata.total_boxes, Some(1));
    assert_eq!(back.metadata.total_points_segmented, Some(6));

    assert!(dir
        .path()
        .join("annotations")
        .join("demo_annotations.json")
        .is_file());
}

#[test]
fn unknown_fields_survive_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonDirStore::new(dir.path());

    let doc: Annotations = serde_json::from_str(
        r#"{"boxes":[{"center":[1,2,0.5],"size":[2,1,1],"id":"b1"}],
            "segmentations":[{"points":[[1.0,2.0,3.0]]}],
            "scene":"traffic_scene","annotator":"ana"}"#,
    )
    .unwrap();
    let receipt = store.save("loose", &doc).unwrap();
    assert_eq!(receipt.stats.segmented_points, 1);

    let raw: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join("loose_annotations.json")).unwrap())
            .unwrap();
    assert_eq!(raw["annotator"], "ana");
    assert_eq!(raw["scene"], "traffic_scene");
    assert_eq!(raw["boxes"][0]["id"], "b1");
    assert_eq!(raw["metadata"]["total_boxes"], 1);

    let back = store.load("loose").unwrap();
    assert_eq!(back.extra, doc.extra);
    assert_eq!(back.boxes, doc.boxes);
    assert_eq!(back.segmentations, doc.segmentations);
}

#[test]
fn missing_project_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonDirStore::new(dir.path());

    let a = store.load("never_saved").unwrap();
    assert!(a.boxes.is_empty());
    assert!(a.segmentations.is_empty());
    assert_eq!(a.metadata.version, "1.0");
    assert!(a.metadata.created_at.is_some());

    assert!(store.load_saved("never_saved").unwrap().is_none());
    assert!(export_kitti(&store, "never_saved").unwrap().is_none());
}

#[test]
fn malformed_document_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken_annotations.json"), "{ boxes: [").unwrap();
    let store = JsonDirStore::new(dir.path());

    match store.load("broken") {
        Err(Error::MalformedAnnotations { project, .. }) => assert_eq!(project, "broken"),
        other => panic!("expected MalformedAnnotations, got {other:?}"),
    }
}

#[test]
fn path_like_project_ids_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonDirStore::new(dir.path());

    assert!(matches!(
        store.save("../escape", &sample()),
        Err(Error::InvalidProjectId(_))
    ));
    assert!(matches!(store.load(""), Err(Error::InvalidProjectId(_))));
}

#[test]
fn kitti_export_of_a_saved_project() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonDirStore::new(dir.path());
    store.save("intersection", &sample()).unwrap();

    let export = export_kitti(&store, "intersection").unwrap().unwrap();
    assert_eq!(export.format, "kitti");
    assert_eq!(export.filename, "intersection.txt");
    assert_eq!(export.content, "car 0 0 0 0 0 0 0 4.5 1.8 1.4 5 -8 0.8 0");
}
