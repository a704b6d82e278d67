//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use eyre::Result;

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// The run is all-or-nothing: the loader is only called once every item has
/// been extracted and transformed, and it is called exactly once.
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must transform from E::Item)
/// - `L`: Loader type (must load T::Output)
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps:
    /// 1. Extract items from source
    /// 2. Transform each item
    /// 3. Load items to destination
    ///
    /// Returns the number of items loaded. Nothing is loaded when the
    /// extractor produces no items.
    ///
    /// # Errors
    /// Returns an error if any stage fails
    pub async fn run(&self) -> Result<usize> {
        log::info!("Starting ETL pipeline");

        log::debug!("Extracting from source...");
        let items = self.extractor.extract().await?;
        log::info!("Extracted {} items", items.len());

        if items.is_empty() {
            log::warn!("No items extracted, pipeline complete");
            return Ok(0);
        }

        log::debug!("Transforming items...");
        let transformed = self.transformer.transform_many(items)?;
        log::info!("Transformed {} items", transformed.len());

        log::debug!("Loading to destination...");
        let count = self.loader.load(transformed).await?;
        log::info!("Loaded {} items", count);

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::Result;
    use std::sync::{Arc, Mutex};

    struct MockExtractor(Vec<i32>);

    impl Extractor for MockExtractor {
        type Item = i32;
        async fn extract(&self) -> Result<Vec<Self::Item>> {
            Ok(self.0.clone())
        }
    }

    struct DoubleTransformer;

    impl Transformer for DoubleTransformer {
        type Input = i32;
        type Output = i32;
        fn transform(&self, input: Self::Input) -> Result<Self::Output> {
            if input < 0 {
                eyre::bail!("negative input {}", input);
            }
            Ok(input * 2)
        }
    }

    /// Records the sum of each load call
    #[derive(Clone, Default)]
    struct SumLoader(Arc<Mutex<Vec<i32>>>);

    impl Loader for SumLoader {
        type Item = i32;
        async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
            let sum: i32 = items.iter().sum();
            self.0.lock().unwrap().push(sum);
            Ok(items.len())
        }
    }

    #[tokio::test]
    async fn test_pipeline() {
        let loader = SumLoader::default();

        let pipeline = Pipeline::new(
            MockExtractor(vec![1, 2, 3]),
            DoubleTransformer,
            loader.clone(),
        );

        let count = pipeline.run().await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(*loader.0.lock().unwrap(), vec![12]); // one load, (1+2+3)*2
    }

    #[tokio::test]
    async fn test_empty_pipeline_skips_load() {
        let loader = SumLoader::default();

        let pipeline = Pipeline::new(MockExtractor(vec![]), DoubleTransformer, loader.clone());

        let count = pipeline.run().await.unwrap();
        assert_eq!(count, 0);
        assert!(loader.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transform_failure_skips_load() {
        let loader = SumLoader::default();

        let pipeline = Pipeline::new(
            MockExtractor(vec![1, -2, 3]),
            DoubleTransformer,
            loader.clone(),
        );

        assert!(pipeline.run().await.is_err());
        assert!(loader.0.lock().unwrap().is_empty());
    }
}
