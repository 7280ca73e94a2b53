use noughts_forest::{Criterion, MaxFeatures, ParamGrid};
use noughts_service::{
    Controller, Response, ServiceConfig,
    controller::{INVALID_REQUEST, SERVER_ERROR, TRAINED},
    dataset,
};
use tempfile::TempDir;

const BOARDS: [&str; 6] = [
    "xxxoobbbb",
    "oooxxbxbb",
    "xoxoxoxox",
    "bbbbbbbbb",
    "xoxxoxoxo",
    "xxxooobbb",
];

fn setup() -> (TempDir, Controller) {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("ml-ttt-data.csv");
    let rows = dataset::generate_dataset(&dataset_path).unwrap();
    assert_eq!(rows, 19683);

    let controller = Controller::new(ServiceConfig {
        dataset_path,
        models_dir: dir.path().join("models"),
        cv_folds: 3,
        param_grid: ParamGrid {
            n_estimators: vec![5],
            max_features: vec![MaxFeatures::Sqrt],
            max_depth: vec![Some(8)],
            criterion: vec![Criterion::Gini, Criterion::Entropy],
        },
        ..ServiceConfig::default()
    });
    (dir, controller)
}

fn predictions(controller: &Controller, variant: &str) -> Vec<String> {
    BOARDS
        .iter()
        .map(|board| controller.get_prediction(board, variant).unwrap())
        .collect()
}

#[test]
fn test_train_predict_and_test() {
    let (_dir, controller) = setup();

    for variant in ["1", "7"] {
        assert_eq!(controller.train_response(variant), Response::ok(TRAINED));
        assert!(controller.store().file_path(variant.parse().unwrap()).exists());

        for board in BOARDS {
            let response = controller.predict_response(board, variant);
            assert_eq!(response.status, 200);
            assert!(
                ["x", "o", "nobody", "everyone"].contains(&response.message.as_str()),
                "{}",
                response.message
            );
        }

        let response = controller.test_response(variant);
        assert_eq!(response.status, 200);
        assert!(response.message.contains("accuracy"), "{}", response.message);
    }
}

#[test]
fn test_retraining_is_deterministic() {
    let (_dir, controller) = setup();

    controller.train_model("2").unwrap();
    let first = predictions(&controller, "2");
    controller.train_model("2").unwrap();
    let second = predictions(&controller, "2");
    assert_eq!(first, second);
}

#[test]
fn test_error_responses() {
    let (_dir, controller) = setup();
    let invalid = Response {
        status: 400,
        message: INVALID_REQUEST.to_owned(),
    };
    let server_error = Response {
        status: 500,
        message: SERVER_ERROR.to_owned(),
    };

    assert_eq!(controller.predict_response("xoxoxoxo", "1"), invalid);
    assert_eq!(controller.predict_response("xoxoxoxoq", "1"), invalid);
    assert_eq!(controller.predict_response("xoxoxoxox", "8"), invalid);
    assert_eq!(controller.train_response("0"), invalid);
    assert_eq!(controller.test_response(""), invalid);

    // nothing has been trained yet
    assert_eq!(controller.predict_response("xoxoxoxox", "3"), server_error);
    assert_eq!(controller.test_response("3"), server_error);
}
