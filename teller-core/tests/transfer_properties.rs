//! Property tests for the transfer engine
//!
//! Arbitrary sequences of transfers between a handful of accounts must never
//! create or destroy money, and must never overdraw an account.

use std::sync::Arc;

use proptest::prelude::*;

use teller_core::adapters::InMemoryRepository;
use teller_core::domain::{Identity, NewAccount, Registration};
use teller_core::ports::AccountRepository;
use teller_core::services::TransferService;
use teller_core::Error;

const ACCOUNTS: usize = 3;

#[derive(Debug, Clone)]
struct Op {
    from: usize,
    to: usize,
    amount: i64,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    (0..ACCOUNTS, 0..ACCOUNTS, -5i64..80).prop_map(|(from, to, amount)| Op { from, to, amount })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

async fn setup(balances: &[i64]) -> (Arc<InMemoryRepository>, Vec<(i64, i64)>) {
    let repo = Arc::new(InMemoryRepository::new());
    let mut accounts = vec![];
    for (i, balance) in balances.iter().enumerate() {
        let registration = Registration {
            first_name: "Prop".to_string(),
            last_name: "User".to_string(),
            email: format!("prop{}@example.com", i),
            password: "password123".to_string(),
        };
        let mut record = NewAccount::new(&registration, "hash");
        record.number = 1_000_000_000 + i as i64;
        let account = repo.create_account(&record).await.unwrap();
        if *balance > 0 {
            repo.adjust_balance(account.id, *balance).await.unwrap();
        }
        accounts.push((account.id, account.number));
    }
    (repo, accounts)
}

async fn balances(repo: &InMemoryRepository, accounts: &[(i64, i64)]) -> Vec<i64> {
    let mut out = vec![];
    for (id, _) in accounts {
        out.push(repo.get_account_by_id(*id).await.unwrap().unwrap().balance);
    }
    out
}

proptest! {
    #[test]
    fn transfers_conserve_total_and_never_overdraw(
        initial in prop::collection::vec(0i64..200, ACCOUNTS),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let (repo, accounts) = setup(&initial).await;
            let service = TransferService::new(repo.clone());
            let total: i64 = initial.iter().sum();

            for op in &ops {
                let before = balances(&repo, &accounts).await;
                let caller = Identity::new(accounts[op.from].1);
                let result = service.transfer(&caller, accounts[op.to].1, op.amount).await;
                let after = balances(&repo, &accounts).await;

                match result {
                    Ok(_) => {
                        prop_assert!(op.amount > 0);
                        prop_assert_ne!(op.from, op.to);
                        prop_assert_eq!(after[op.from], before[op.from] - op.amount);
                        prop_assert_eq!(after[op.to], before[op.to] + op.amount);
                    }
                    Err(Error::Validation(_)) => {
                        prop_assert!(op.amount <= 0 || op.from == op.to);
                        prop_assert_eq!(&after, &before);
                    }
                    Err(Error::InsufficientFunds { available, requested }) => {
                        prop_assert!(available < requested);
                        prop_assert_eq!(&after, &before);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {}", e),
                }

                prop_assert!(after.iter().all(|b| *b >= 0));
                prop_assert_eq!(after.iter().sum::<i64>(), total);
            }
            Ok(())
        })?;
    }
}
