use std::time::Duration;

use emission_zk_integration::{DevServiceBuilder, setup_logger, testers::call};
use emission_zk_prover::{PreparationOutcome, PreparationState};

#[tokio::test]
async fn prepare_download_compiles_once() -> eyre::Result<()> {
    setup_logger()?;
    let dev = DevServiceBuilder::default().build();

    let first = dev.service.prepare_download().wait().await?;
    let second = dev.service.prepare_download().wait().await?;

    assert!(matches!(first, PreparationOutcome::Compiled(_)));
    assert!(matches!(second, PreparationOutcome::AlreadyPrepared(_)));
    assert_eq!(dev.backend.compiles(), 1);
    assert_eq!(dev.calls.calls(), vec![call::COMPILE]);

    let compiled = dev.service.gate().compiled().await.expect("prepared");
    assert_eq!(compiled.circuit, "emission");
    assert_eq!(compiled.out_dir, dev.service.config().dirs.circuit);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_triggers_share_one_compilation() -> eyre::Result<()> {
    setup_logger()?;
    let dev = DevServiceBuilder::default()
        .compile_delay(Duration::from_millis(100))
        .build();

    let handles: Vec<_> = (0..8).map(|_| dev.service.prepare_download()).collect();
    // Acknowledged before the compilation finishes.
    assert!(handles.iter().any(|h| !h.is_finished()));

    let mut digests = Vec::new();
    for handle in handles {
        let outcome = handle.wait().await?;
        digests.push(outcome.compiled().expect("compiled").vk_digest);
    }

    assert_eq!(dev.backend.compiles(), 1);
    assert!(digests.windows(2).all(|w| w[0] == w[1]));
    Ok(())
}

#[tokio::test]
async fn failed_preparation_can_be_triggered_again() -> eyre::Result<()> {
    setup_logger()?;
    let dev = DevServiceBuilder::default().compile_failures(1).build();

    let outcome = dev.service.prepare_download().wait().await?;
    let PreparationOutcome::Failed(msg) = outcome else {
        panic!("expected a failed preparation, got {outcome:?}");
    };
    assert!(msg.starts_with("failed to download srs"), "{msg}");
    assert_eq!(dev.service.gate().state().await, PreparationState::NotPrepared);

    let outcome = dev.service.prepare_download().wait().await?;
    assert!(matches!(outcome, PreparationOutcome::Compiled(_)));
    assert_eq!(dev.backend.compiles(), 2);
    Ok(())
}
