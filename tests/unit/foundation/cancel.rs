use super::*;

#[test]
fn clones_share_the_flag() {
    let token = CancelToken::new();
    let handle = token.clone();
    assert!(token.check().is_ok());

    handle.cancel();
    assert!(token.is_cancelled());
    assert!(matches!(token.check(), Err(ReelError::Cancelled)));
}

#[test]
fn cancel_is_idempotent() {
    let token = CancelToken::new();
    token.cancel();
    token.cancel();
    assert!(token.is_cancelled());
}
