// src/algorithms/tests/mod.rs



/// Behaviour both algorithms share
#[cfg(test)]
mod common_tests {
    use crate::{
        algorithms::{FixedWindow, SlidingWindow, WindowAlgorithm, WindowDecision},
        quota::WindowStrategy,
        test_utils::{MockStorage, NOW},
    };

    fn algorithms(storage: &MockStorage) -> Vec<Box<dyn WindowAlgorithm>> {
        vec![
            Box::new(FixedWindow::new(storage.clone())),
            Box::new(SlidingWindow::new(storage.clone())),
        ]
    }

    #[tokio::test]
    async fn test_limit_then_reject() {
        let storage = MockStorage::new();

        for algorithm in algorithms(&storage) {
            let key = format!("limit_{}", algorithm.strategy());

            for i in 1..=5 {
                let decision = algorithm.check(&key, 5, 3600, NOW).await.unwrap();
                match decision {
                    WindowDecision::Accepted(usage) => assert_eq!(usage.current_usage, i),
                    other => panic!("{}: request {} gave {:?}", key, i, other),
                }
            }

            let decision = algorithm.check(&key, 5, 3600, NOW).await.unwrap();
            match decision {
                WindowDecision::Rejected(details) => {
                    assert_eq!(details.identifier, key);
                    assert_eq!(details.limit, 5);
                    assert_eq!(details.current_usage, 5);
                }
                other => panic!("{}: sixth request gave {:?}", key, other),
            }
        }
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let storage = MockStorage::new();

        for algorithm in algorithms(&storage) {
            let user1 = format!("{}_user1", algorithm.strategy());
            let user2 = format!("{}_user2", algorithm.strategy());

            assert!(algorithm.check(&user1, 1, 60, NOW).await.unwrap().is_accepted());
            assert!(!algorithm.check(&user1, 1, 60, NOW).await.unwrap().is_accepted());
            assert!(algorithm.check(&user2, 1, 60, NOW).await.unwrap().is_accepted());
        }
    }

    #[tokio::test]
    async fn test_strategy_names() {
        let storage = MockStorage::new();
        let strategies: Vec<_> = algorithms(&storage).iter().map(|a| a.strategy()).collect();
        assert_eq!(strategies, vec![WindowStrategy::Fixed, WindowStrategy::Sliding]);
    }
}
