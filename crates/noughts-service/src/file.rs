//! Persistence of trained models, one JSON file per variant.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use crate::{recipe::ModelVariant, training::TrainedModel};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ModelFileError {
    #[display("failed to access model file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("invalid model file {}: {source}", path.display())]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{dir}/model_{variant}.json`
    #[must_use]
    pub fn file_path(&self, variant: ModelVariant) -> PathBuf {
        self.dir.join(format!("model_{variant}.json"))
    }

    /// Writes `model` to a uniquely named temporary file next to its final path and renames
    /// it into place, so readers see either the previous file or the complete new one. Saves
    /// of the same variant may run concurrently; the last rename wins.
    pub fn save(
        &self,
        model: &TrainedModel,
        variant: ModelVariant,
    ) -> Result<PathBuf, ModelFileError> {
        let path = self.file_path(variant);
        let io_error = |path: &Path| {
            let path = path.to_owned();
            move |source| ModelFileError::Io { path, source }
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".model_{variant}."))
            .suffix(".json.tmp")
            .tempfile_in(&self.dir)
            .map_err(io_error(&self.dir))?;
        let tmp_path = tmp.path().to_owned();
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(&mut writer, model).map_err(|source| ModelFileError::Format {
            path: tmp_path.clone(),
            source,
        })?;
        writer.flush().map_err(io_error(&tmp_path))?;
        drop(writer);
        tmp.persist(&path).map_err(|err| io_error(&path)(err.error))?;

        tracing::info!(%variant, path = %path.display(), "saved model");
        Ok(path)
    }

    pub fn load(&self, variant: ModelVariant) -> Result<TrainedModel, ModelFileError> {
        let path = self.file_path(variant);
        let file = File::open(&path).map_err(|source| ModelFileError::Io {
            path: path.clone(),
            source,
        })?;
        let model = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| ModelFileError::Format {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(%variant, path = %path.display(), "loaded model");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ndarray::array;
    use noughts_forest::{ForestParams, RandomForest};

    use std::{fs, thread};

    use super::*;

    fn model() -> TrainedModel {
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]];
        let mut forest = RandomForest::new(ForestParams {
            n_estimators: 4,
            ..ForestParams::default()
        });
        forest.fit(x.view(), &["x", "o", "x", "nobody"]).unwrap();
        TrainedModel {
            variant: ModelVariant::Ordinal,
            trained_at: Utc::now(),
            feature_columns: vec!["a".to_owned(), "b".to_owned()],
            cv_score: 0.5,
            forest,
        }
    }

    #[test]
    fn test_file_path() {
        let store = ModelStore::new("models");
        assert_eq!(
            store.file_path(ModelVariant::Ordinal),
            Path::new("models/model_2.json")
        );
        assert_eq!(
            store.file_path(ModelVariant::UpsampledAdjacency),
            Path::new("models/model_7.json")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let model = model();

        let path = store.save(&model, ModelVariant::Ordinal).unwrap();
        assert_eq!(path, store.file_path(ModelVariant::Ordinal));
        let loaded = store.load(ModelVariant::Ordinal).unwrap();
        assert_eq!(loaded.variant, model.variant);
        assert_eq!(loaded.trained_at, model.trained_at);
        assert_eq!(loaded.feature_columns, model.feature_columns);
        assert_eq!(loaded.forest.classes(), model.forest.classes());

        let rows = array![[1.0, 1.0], [0.0, 0.0], [0.0, 1.0]];
        assert_eq!(
            loaded.forest.predict(rows.view()).unwrap(),
            model.forest.predict(rows.view()).unwrap()
        );

        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let mut model = model();
        store.save(&model, ModelVariant::Onehot).unwrap();
        model.cv_score = 0.75;
        store.save(&model, ModelVariant::Onehot).unwrap();
        let loaded = store.load(ModelVariant::Onehot).unwrap();
        assert!((loaded.cv_score - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        assert!(matches!(
            store.load(ModelVariant::Ordinal),
            Err(ModelFileError::Io { .. })
        ));

        fs::write(store.file_path(ModelVariant::Ordinal), "{ not json").unwrap();
        assert!(matches!(
            store.load(ModelVariant::Ordinal),
            Err(ModelFileError::Format { .. })
        ));

        let missing = ModelStore::new(dir.path().join("no/such/dir"));
        assert!(matches!(
            missing.save(&model(), ModelVariant::Ordinal),
            Err(ModelFileError::Io { .. })
        ));
    }

    #[test]
    fn test_concurrent_saves_of_same_variant() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let mut first = model();
        first.cv_score = 0.25;
        let mut second = model();
        second.cv_score = 0.75;
        store.save(&first, ModelVariant::Ordinal).unwrap();

        thread::scope(|s| {
            for model in [&first, &second] {
                let store = &store;
                s.spawn(move || {
                    for _ in 0..20 {
                        store.save(model, ModelVariant::Ordinal).unwrap();
                    }
                });
            }
            s.spawn(|| {
                for _ in 0..20 {
                    let loaded = store.load(ModelVariant::Ordinal).unwrap();
                    assert!([0.25, 0.75].contains(&loaded.cv_score));
                }
            });
        });

        let loaded = store.load(ModelVariant::Ordinal).unwrap();
        assert!([0.25, 0.75].contains(&loaded.cv_score));
        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        // a directory at the model path makes the final rename fail
        fs::create_dir(store.file_path(ModelVariant::Ordinal)).unwrap();
        assert!(matches!(
            store.save(&model(), ModelVariant::Ordinal),
            Err(ModelFileError::Io { .. })
        ));
        let names = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect::<Vec<_>>();
        assert_eq!(names, ["model_2.json"]);
    }
}
