//! Proptest generators for property-based testing.

use proptest::prelude::*;

use deedkit_core::{Action, EnvelopeBuilder, Identity, Nonce, Transaction};

/// Generate a random identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 32]>().prop_map(|seed| Identity::from_seed(&seed))
}

/// Generate a random nonce.
pub fn nonce() -> impl Strategy<Value = Nonce> {
    any::<[u8; 16]>().prop_map(Nonce::from_bytes)
}

/// Generate a deed action.
pub fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Create),
        Just(Action::Transfer),
        Just(Action::Delete),
    ]
}

/// Generate a resource name free of the payload delimiter.
pub fn resource_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.-]{1,40}".prop_map(String::from)
}

/// Generate any UTF-8 resource name, delimiter included.
pub fn any_resource_name() -> impl Strategy<Value = String> {
    ".{0,64}".prop_map(String::from)
}

/// Generate an owner name.
pub fn owner() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,15}".prop_map(String::from)
}

/// Parameters for generating a transaction.
#[derive(Debug, Clone)]
pub struct TxParams {
    pub identity: Identity,
    pub resource_name: String,
    pub action: Action,
    pub owner: String,
    pub nonce: Nonce,
}

impl Arbitrary for TxParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (identity(), resource_name(), action(), owner(), nonce())
            .prop_map(|(identity, resource_name, action, owner, nonce)| TxParams {
                identity,
                resource_name,
                action,
                owner,
                nonce,
            })
            .boxed()
    }
}

/// Build a transaction from parameters.
pub fn tx_from_params(params: &TxParams) -> Transaction {
    EnvelopeBuilder::new().build_transaction_with_nonce(
        &params.identity,
        &params.resource_name,
        params.action.as_str(),
        &params.owner,
        params.nonce,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use deedkit_core::{address_for, validate_batch, validate_transaction, Payload};

    proptest! {
        #[test]
        fn test_transactions_validate(params: TxParams) {
            let tx = tx_from_params(&params);
            prop_assert!(validate_transaction(&tx).is_ok());
        }

        #[test]
        fn test_fixed_nonce_is_deterministic(params: TxParams) {
            prop_assert_eq!(tx_from_params(&params), tx_from_params(&params));
        }

        #[test]
        fn test_transaction_targets_its_address(params: TxParams) {
            let tx = tx_from_params(&params);
            let expected = address_for(&params.resource_name);
            prop_assert_eq!(tx.address(), Some(&expected));
            prop_assert_eq!(&tx.header().inputs, &tx.header().outputs);
        }

        #[test]
        fn test_payload_decodes(params: TxParams) {
            let tx = tx_from_params(&params);
            let payload = Payload::decode(tx.payload()).unwrap();
            prop_assert_eq!(payload.resource_name, params.resource_name);
            prop_assert_eq!(payload.action, params.action.as_str());
            prop_assert_eq!(payload.owner, params.owner);
        }

        #[test]
        fn test_batch_ids_follow_input_order(
            a in any::<TxParams>(),
            b in any::<TxParams>(),
            signer in identity(),
        ) {
            let t1 = tx_from_params(&a);
            let t2 = tx_from_params(&b);
            let expected = vec![*t1.signature(), *t2.signature()];

            let batch = EnvelopeBuilder::new()
            .build_batch(vec![t1, t2], &signer)
            .unwrap();
            prop_assert_eq!(&batch.header().transaction_ids, &expected);
            prop_assert!(validate_batch(&batch).is_ok());
        }

        #[test]
        fn test_any_name_has_valid_address(name in any_resource_name()) {
            let address = address_for(&name);
            prop_assert_eq!(address.as_str().len(), 70);
            prop_assert!(address
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }
}
