//! Implements the `TransactionRepository` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a ledger server. It applies the same filtering rules the server
//! does, so it also serves as the reference for what a list query means.

use crate::api::TransactionRepository;
use crate::error::{Error, ErrorType, IntoResult, Res, Result};
use crate::filter::ListQuery;
use crate::model::{Transaction, TransactionFields};
use crate::session::Session;
use anyhow::Context;
use chrono::{Days, Local, NaiveDate};
use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::trace;
use uuid::Uuid;

/// The repository operations, used to inject failures and count calls.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct State {
    transactions: Vec<Transaction>,
    failures: HashMap<Op, Vec<ErrorType>>,
    calls: HashMap<Op, usize>,
}

impl State {
    /// Counts the call and returns an injected failure if one is queued for `op`.
    fn enter(&mut self, op: Op) -> Result<()> {
        *self.calls.entry(op).or_default() += 1;
        match self.failures.get_mut(&op).and_then(|queue| queue.pop()) {
            Some(kind) => Err(Error::msg(kind, format!("Injected {kind} failure for {op:?}"))),
            None => Ok(()),
        }
    }

    fn position(&self, session: &Session, id: &str) -> Result<usize> {
        self.transactions
            .iter()
            .position(|t| t.id() == id && t.user_id() == session.user_id())
            .ok_or_else(|| Error::msg(ErrorType::NotFound, format!("Transaction not found: {id}")))
    }
}

/// An in-memory transaction store. Date presets are resolved relative to `today`, which is fixed
/// at construction so that results are deterministic.
#[derive(Debug)]
pub struct MemoryRepository {
    today: NaiveDate,
    state: Mutex<State>,
}

impl MemoryRepository {
    /// Create an empty store whose presets are resolved relative to `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            state: Mutex::new(State::default()),
        }
    }

    /// Create a store, relative to the local date, seeded with sample data owned by `user_id`.
    pub fn seeded(user_id: &str) -> Result<Self> {
        let today = Local::now().date_naive();
        let transactions = load_seed(SEED_DATA, user_id, today)
            .context("Unable to seed the in-memory repository")
            .pub_result(ErrorType::Config)?;
        Ok(Self {
            today,
            state: Mutex::new(State {
                transactions,
                ..State::default()
            }),
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Adds transactions as if they already existed on the server.
    pub async fn insert(&self, transactions: impl IntoIterator<Item = Transaction>) {
        self.state.lock().await.transactions.extend(transactions);
    }

    /// Makes the next call of `op` fail with `kind`. Queued failures are used up last-in first-out.
    pub async fn fail_next(&self, op: Op, kind: ErrorType) {
        self.state
            .lock()
            .await
            .failures
            .entry(op)
            .or_default()
            .push(kind);
    }

    /// How many times `op` has been called, including failed calls.
    pub async fn calls(&self, op: Op) -> usize {
        self.state
            .lock()
            .await
            .calls
            .get(&op)
            .copied()
            .unwrap_or_default()
    }

    /// Every stored transaction, for any user, in insertion order.
    pub async fn all(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

#[async_trait::async_trait]
impl TransactionRepository for MemoryRepository {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Transaction>> {
        let mut state = self.state.lock().await;
        state.enter(Op::List)?;
        let mut found: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| query.matches(t, self.today))
            .cloned()
            .collect();
        // Newest first; ties keep insertion order.
        found.sort_by(|a, b| b.date().cmp(&a.date()));
        trace!("list matched {} transactions", found.len());
        Ok(found)
    }

    async fn create(
        &self,
        session: &Session,
        fields: &TransactionFields,
    ) -> Result<Option<Transaction>> {
        let mut state = self.state.lock().await;
        state.enter(Op::Create)?;
        fields.validate().pub_result(ErrorType::Validation)?;
        let id = Uuid::new_v4().simple().to_string();
        let transaction = Transaction::from_fields(id, session.user_id(), fields.clone());
        state.transactions.push(transaction.clone());
        Ok(Some(transaction))
    }

    async fn update(&self, session: &Session, id: &str, fields: &TransactionFields) -> Result<()> {
        let mut state = self.state.lock().await;
        state.enter(Op::Update)?;
        let ix = state.position(session, id)?;
        fields.validate().pub_result(ErrorType::Validation)?;
        state.transactions[ix].apply(fields.clone());
        Ok(())
    }

    async fn delete(&self, session: &Session, id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.enter(Op::Delete)?;
        let ix = state.position(session, id)?;
        state.transactions.remove(ix);
        Ok(())
    }
}

/// Loads seed transactions from CSV. Dates are given as a number of days before `today` so that
/// the sample data always falls inside the presets.
fn load_seed(csv_data: &str, user_id: &str, today: NaiveDate) -> Res<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut transactions = Vec::new();
    for (ix, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |i: usize| {
            record
                .get(i)
                .with_context(|| format!("Seed row {} is missing column {i}", ix + 1))
        };
        let days_ago: u64 = field(0)?.parse()?;
        let date = today
            .checked_sub_days(Days::new(days_ago))
            .with_context(|| format!("Seed row {} has an impossible date", ix + 1))?;
        let fields = TransactionFields {
            date,
            amount: FromStr::from_str(field(1)?)?,
            kind: FromStr::from_str(field(2)?)?,
            category: FromStr::from_str(field(3)?)?,
            reference: field(4)?.to_string(),
            description: field(5)?.to_string(),
        };
        transactions.push(Transaction::from_fields(
            format!("seed{:03}", ix + 1),
            user_id,
            fields,
        ));
    }
    Ok(transactions)
}

/// Seed transaction data.
const SEED_DATA: &str = r##"days_ago,amount,type,category,reference,description
0,4200.00,income,salary,PAY-2024-10,Monthly salary
1,18.50,expense,food,,Lunch with the team
2,12.00,expense,movie,TKT-5531,Friday night movie
4,95.40,expense,bills,ELEC-0921,Electricity
6,40.00,income,tip,,Weekend gig tips
9,1250.00,income,project,INV-0042,Website redesign milestone
12,64.99,expense,medical,RX-7781,Pharmacy
20,15.00,expense,fee,,Bank account fee
45,310.00,expense,tax,TAX-Q3,Quarterly estimated tax
120,88.20,expense,food,,Groceries
"##;
