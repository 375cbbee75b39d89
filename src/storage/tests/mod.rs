// src/storage/tests/mod.rs


// Common utilities for storage tests
pub(crate) mod common {
    use crate::error::StorageResult;
    use crate::storage::StorageBackend;

    // Test basic storage operations that should work on any backend
    pub async fn test_basic_operations<S: StorageBackend>(storage: &S) -> StorageResult<()> {
        let key = "test_basic_key";

        // Missing keys read as absent
        assert_eq!(storage.get(key).await?, None);

        storage.set(key, b"2:999000").await?;
        assert_eq!(storage.get(key).await?.as_deref(), Some(&b"2:999000"[..]));

        // Set replaces the whole value
        storage.set(key, b"999000,999500").await?;
        assert_eq!(
            storage.get(key).await?.as_deref(),
            Some(&b"999000,999500"[..])
        );

        assert!(storage.delete(key).await?);
        assert_eq!(storage.get(key).await?, None);

        // Deleting a missing key is not an error
        assert!(!storage.delete(key).await?);

        Ok(())
    }

    // Values are opaque bytes and come back unchanged
    pub async fn test_binary_values<S: StorageBackend>(storage: &S) -> StorageResult<()> {
        let key = "test_binary_key";
        let value = [0u8, 255, 10, 58, 44];

        storage.set(key, &value).await?;
        assert_eq!(storage.get(key).await?, Some(value.to_vec()));

        storage.delete(key).await?;
        Ok(())
    }
}
