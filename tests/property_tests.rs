use name_commit_registrar::controller::constants::{MAX_COMMITMENT_AGE, MIN_COMMITMENT_AGE};
use name_commit_registrar::controller::host::AbortReason;
use name_commit_registrar::utils::hash::make_commitment;
use name_commit_registrar::{
    AccountId, CallContext, ControllerError, FixedRateOracle, InMemoryLedger, RegisterOutcome,
    RegistrarController,
};
use proptest::prelude::*;
use std::sync::Arc;

// Property-based tests for the commit-reveal controller

const T0: u64 = 1_700_000_000;
const YEAR: u64 = 365 * 24 * 60 * 60;

type Controller = RegistrarController<InMemoryLedger>;

fn arbitrary_secret() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

fn committed(name: &str, secret: &[u8; 32], rate: u64) -> Controller {
    let oracle = Arc::new(FixedRateOracle::flat(AccountId::from_tag(9), rate));
    let mut c = Controller::new(AccountId::from_tag(1), InMemoryLedger::new(), oracle);
    c.commit(
        &CallContext::unpaid(AccountId::from_tag(2), T0),
        make_commitment(name, secret),
    )
    .unwrap();
    c
}

proptest! {
    #[test]
    fn validity_is_more_than_six_chars(name in "\\PC{0,12}") {
        prop_assert_eq!(Controller::valid(&name), name.chars().count() > 6);
    }

    #[test]
    fn refund_is_value_minus_cost(
        secret in arbitrary_secret(),
        rate in 1u64..=100,
        extra in 0u64..=1_000_000_000,
    ) {
        let name = "propertyname";
        let mut c = committed(name, &secret, rate);
        let cost = c.rent_price(name, YEAR).unwrap();
        let ctx = CallContext::new(AccountId::from_tag(2), cost + extra, T0 + MIN_COMMITMENT_AGE);

        let outcome = c.register(&ctx, name, AccountId::from_tag(2), YEAR, &secret).unwrap();
        prop_assert_eq!(outcome, RegisterOutcome::Registered {
            expires: T0 + MIN_COMMITMENT_AGE + YEAR,
            cost,
            refund: extra,
        });
        prop_assert_eq!(c.balance(), cost);
    }

    #[test]
    fn reveal_outcome_follows_the_windows(
        secret in arbitrary_secret(),
        elapsed in 0u64..=(MAX_COMMITMENT_AGE * 2),
    ) {
        let name = "windowname";
        let mut c = committed(name, &secret, 1);
        let ctx = CallContext::new(AccountId::from_tag(2), YEAR, T0 + elapsed);
        let result = c.register(&ctx, name, AccountId::from_tag(2), YEAR, &secret);

        if elapsed < MIN_COMMITMENT_AGE {
            let too_new = matches!(result, Err(ControllerError::CommitmentTooNew { .. }));
            prop_assert!(too_new);
            prop_assert_eq!(c.pending_commitments(), 1);
        } else if elapsed > MAX_COMMITMENT_AGE {
            prop_assert_eq!(result, Ok(RegisterOutcome::Refunded {
                reason: AbortReason::CommitmentExpired,
                refund: YEAR,
            }));
            prop_assert!(c.ledger().is_empty());
            prop_assert_eq!(c.pending_commitments(), 1);
            prop_assert_eq!(c.commitment_timestamp(&make_commitment(name, &secret)), T0);
        } else {
            prop_assert!(result.unwrap().is_registered());
            prop_assert_eq!(c.pending_commitments(), 0);
        }
    }

    #[test]
    fn wrong_secret_never_reveals(
        secret in arbitrary_secret(),
        other in arbitrary_secret(),
    ) {
        prop_assume!(secret != other);
        let name = "secretname";
        let mut c = committed(name, &secret, 1);
        let ctx = CallContext::new(AccountId::from_tag(3), YEAR, T0 + MIN_COMMITMENT_AGE);
        let result = c.register(&ctx, name, AccountId::from_tag(3), YEAR, &other);
        prop_assert_eq!(result, Err(ControllerError::CommitmentNotFound));
    }
}
