//! Property-Based Tests for Session Signing

use proptest::prelude::*;

use crate::session::{OrderItem, SessionPayload, SessionSigner};

fn item_strategy() -> impl Strategy<Value = OrderItem> {
    (1i64..10_000, 0u32..100, 0i64..1_000_000)
        .prop_map(|(pid, qty, price)| OrderItem::new(pid, qty, price))
}

fn payload_strategy() -> impl Strategy<Value = SessionPayload> {
    (
        prop::option::of(1i64..1_000_000),
        prop::collection::vec(item_strategy(), 0..12),
    )
        .prop_map(|(user_id, items)| SessionPayload {
            user_id,
            items,
            auth_tag: None,
        })
}

#[derive(Debug, Clone)]
enum Tamper {
    UserId(Option<i64>),
    Quantity(usize, u32),
    Price(usize, i64),
    ProductId(usize, i64),
    DropItem(usize),
    AppendItem(OrderItem),
}

fn tamper_strategy() -> impl Strategy<Value = Tamper> {
    prop_oneof![
        prop::option::of(any::<i64>()).prop_map(Tamper::UserId),
        (any::<usize>(), any::<u32>()).prop_map(|(i, q)| Tamper::Quantity(i, q)),
        (any::<usize>(), any::<i64>()).prop_map(|(i, p)| Tamper::Price(i, p)),
        (any::<usize>(), any::<i64>()).prop_map(|(i, p)| Tamper::ProductId(i, p)),
        any::<usize>().prop_map(Tamper::DropItem),
        item_strategy().prop_map(Tamper::AppendItem),
    ]
}

/// Applies the tamper; returns false when it left the payload unchanged.
fn apply(payload: &mut SessionPayload, tamper: Tamper) -> bool {
    let before = payload.clone();
    let len = payload.items.len();
    match tamper {
        Tamper::UserId(uid) => payload.user_id = uid,
        Tamper::Quantity(i, q) if len > 0 => payload.items[i % len].quantity = q,
        Tamper::Price(i, p) if len > 0 => payload.items[i % len].unit_price_minor_units = p,
        Tamper::ProductId(i, p) if len > 0 => payload.items[i % len].product_id = p,
        Tamper::DropItem(i) if len > 0 => {
            payload.items.remove(i % len);
        }
        Tamper::AppendItem(item) => payload.items.push(item),
        _ => {}
    }
    *payload != before
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Signing an unmodified payload always verifies.
    #[test]
    fn prop_sign_then_verify(payload in payload_strategy(), secret in "[a-z0-9]{1,32}") {
        let signer = SessionSigner::new(secret).unwrap();
        let signed = signer.sign(payload);
        prop_assert!(signer.verify(&signed));
    }

    // Any change to a covered field after signing is rejected until re-signed.
    #[test]
    fn prop_mutation_breaks_tag(payload in payload_strategy(), tamper in tamper_strategy()) {
        let signer = SessionSigner::new("shared-secret").unwrap();
        let mut signed = signer.sign(payload);

        prop_assume!(apply(&mut signed, tamper));
        prop_assert!(!signer.verify(&signed));

        let resigned = signer.sign(signed);
        prop_assert!(signer.verify(&resigned));
    }
}
