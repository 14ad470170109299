//! In-process fake chain.
//!
//! Mines one block per submitted transaction and emulates the OTP contract
//! from its ABI: `generateOTP` stores a fresh 6-digit code in a single slot,
//! `validateOTP(x)` reports whether `x` matches the slot and clears it on a
//! match. Used by tests and by `ledger.mode = "memory"`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{keccak256, Address, Log, B256, U256};
use async_trait::async_trait;

use crate::contract::{OtpCall, OtpContract};
use crate::ledger::types::{
    ContractCall, GasPlan, LedgerBlock, LedgerError, LedgerReceipt, LedgerResult,
    LedgerTransaction,
};
use crate::ledger::Ledger;

const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

struct ChainState {
    accounts: Vec<Address>,
    balances: HashMap<Address, U256>,
    blocks: Vec<LedgerBlock>,
    /// The contract's single outstanding OTP.
    otp_slot: Option<DynSolValue>,
    /// Codes handed out before falling back to random ones.
    scripted_otps: VecDeque<String>,
    submissions: Vec<(Address, GasPlan)>,
}

/// A fake ledger node holding its whole chain in memory.
pub struct MemoryLedger {
    contract: Arc<OtpContract>,
    state: Mutex<ChainState>,
    offline: AtomicBool,
    drop_events: AtomicBool,
}

impl MemoryLedger {
    pub const CHAIN_ID: u64 = 1337;
    /// Gas price reported by the fake node, in wei (20 gwei).
    pub const GAS_PRICE: u128 = 20_000_000_000;
    pub const GENERATE_GAS: u64 = 45_000;
    pub const VALIDATE_GAS: u64 = 32_000;
    pub const TRANSFER_GAS: u64 = 21_000;
    pub const ACCOUNT_COUNT: usize = 10;

    /// A chain with funded accounts and only the genesis block.
    pub fn new(contract: Arc<OtpContract>) -> Self {
        let accounts: Vec<Address> = (0..Self::ACCOUNT_COUNT)
            .map(|i| Address::repeat_byte(0x11 * (i as u8 + 1)))
            .collect();
        let balances = accounts
            .iter()
            .map(|account| (*account, U256::from(100 * ONE_ETHER)))
            .collect();
        let genesis = LedgerBlock {
            number: 0,
            hash: keccak256(0u64.to_be_bytes()),
            parent_hash: B256::ZERO,
            nonce: 0,
            gas_used: 0,
            timestamp: now_secs(),
            transactions: Vec::new(),
        };

        Self {
            contract,
            state: Mutex::new(ChainState {
                accounts,
                balances,
                blocks: vec![genesis],
                otp_slot: None,
                scripted_otps: VecDeque::new(),
                submissions: Vec::new(),
            }),
            offline: AtomicBool::new(false),
            drop_events: AtomicBool::new(false),
        }
    }

    /// Make every call fail as if the node were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Mine transactions without their event logs.
    pub fn set_drop_events(&self, drop: bool) {
        self.drop_events.store(drop, Ordering::SeqCst);
    }

    /// Queue codes for the next `generateOTP` calls.
    pub fn script_otps<T: ToString>(&self, codes: impl IntoIterator<Item = T>) {
        self.state()
            .scripted_otps
            .extend(codes.into_iter().map(|code| code.to_string()));
    }

    /// Sender and gas plan of every submitted transaction.
    pub fn submissions(&self) -> Vec<(Address, GasPlan)> {
        self.state().submissions.clone()
    }

    /// Mine a block with no transactions and return its number.
    pub fn mine_empty_block(&self) -> u64 {
        let mut state = self.state();
        Self::mine(&mut state, Vec::new(), 0)
    }

    /// Move `value` wei between two accounts in a block of its own.
    pub fn transfer(&self, from: Address, to: Address, value: U256) -> LedgerResult<B256> {
        self.check_online()?;
        let mut state = self.state();
        let fee = U256::from(Self::TRANSFER_GAS as u128 * Self::GAS_PRICE);
        Self::debit(&mut state, from, value + fee)?;
        *state.balances.entry(to).or_default() += value;

        let hash = tx_hash(from, state.submissions.len(), &value.to_be_bytes::<32>());
        let tx = LedgerTransaction {
            hash,
            from,
            to: Some(to),
            value,
        };
        Self::mine(&mut state, vec![tx], Self::TRANSFER_GAS);
        Ok(hash)
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_online(&self) -> LedgerResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable(
                "connection refused (memory ledger offline)".to_string(),
            ));
        }
        Ok(())
    }

    fn debit(state: &mut ChainState, account: Address, amount: U256) -> LedgerResult<()> {
        let balance = state.balances.entry(account).or_default();
        if *balance < amount {
            return Err(LedgerError::Rpc(format!(
                "insufficient funds for gas * price + value: {}",
                account
            )));
        }
        *balance -= amount;
        Ok(())
    }

    fn mine(state: &mut ChainState, transactions: Vec<LedgerTransaction>, gas_used: u64) -> u64 {
        let parent = state
            .blocks
            .last()
            .map(|block| (block.hash, block.timestamp))
            .unwrap_or((B256::ZERO, 0));
        let number = state.blocks.len() as u64;
        let mut seed = number.to_be_bytes().to_vec();
        for tx in &transactions {
            seed.extend_from_slice(tx.hash.as_slice());
        }
        state.blocks.push(LedgerBlock {
            number,
            hash: keccak256(&seed),
            parent_hash: parent.0,
            nonce: 0,
            gas_used,
            timestamp: now_secs().max(parent.1 + 1),
            transactions,
        });
        number
    }

    fn gas_for(&self, call: &ContractCall) -> LedgerResult<u64> {
        if call.to != self.contract.address() {
            return Err(LedgerError::Rpc(format!("no contract code at {}", call.to)));
        }
        match self.contract.decode_call(&call.input) {
            Some(OtpCall::Generate) => Ok(Self::GENERATE_GAS),
            Some(OtpCall::Validate(_)) => Ok(Self::VALIDATE_GAS),
            None => Err(LedgerError::Rpc("execution reverted".to_string())),
        }
    }

    /// Run the contract logic and return the emitted logs.
    fn execute(&self, state: &mut ChainState, from: Address, call: &ContractCall) -> Option<Vec<Log>> {
        match self.contract.decode_call(&call.input)? {
            OtpCall::Generate => {
                let code = state
                    .scripted_otps
                    .pop_front()
                    .unwrap_or_else(|| fastrand::u64(100_000..1_000_000).to_string());
                let otp = match self.contract.candidate_type() {
                    DynSolType::String => DynSolValue::String(code),
                    ty => ty.coerce_str(&code).ok()?,
                };
                state.otp_slot = Some(otp.clone());
                Some(vec![self.contract.generated_log(from, otp).ok()?])
            }
            OtpCall::Validate(candidate) => {
                let is_valid = state.otp_slot.as_ref() == Some(&candidate);
                if is_valid {
                    state.otp_slot = None;
                }
                Some(vec![self.contract.validated_log(from, is_valid).ok()?])
            }
        }
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn accounts(&self) -> LedgerResult<Vec<Address>> {
        self.check_online()?;
        Ok(self.state().accounts.clone())
    }

    async fn estimate_gas(&self, _from: Address, call: &ContractCall) -> LedgerResult<u64> {
        self.check_online()?;
        self.gas_for(call)
    }

    async fn gas_price(&self) -> LedgerResult<u128> {
        self.check_online()?;
        Ok(Self::GAS_PRICE)
    }

    async fn submit(
        &self,
        from: Address,
        call: &ContractCall,
        plan: GasPlan,
    ) -> LedgerResult<LedgerReceipt> {
        self.check_online()?;
        let needed = self.gas_for(call)?;

        let mut state = self.state();
        if !state.accounts.contains(&from) {
            return Err(LedgerError::Rpc(format!("sender account not recognized: {}", from)));
        }
        let gas_used = needed.min(plan.gas_limit);
        Self::debit(&mut state, from, U256::from(gas_used as u128 * plan.gas_price))?;
        state.submissions.push((from, plan));

        let hash = tx_hash(from, state.submissions.len(), &call.input);
        let logs = if plan.gas_limit < needed {
            None
        } else {
            self.execute(&mut state, from, call)
        };
        let success = logs.is_some();
        let logs = if self.drop_events.load(Ordering::SeqCst) {
            Vec::new()
        } else {
            logs.unwrap_or_default()
        };

        let tx = LedgerTransaction {
            hash,
            from,
            to: Some(call.to),
            value: U256::ZERO,
        };
        let block_number = Self::mine(&mut state, vec![tx], gas_used);

        Ok(LedgerReceipt {
            tx_hash: hash,
            block_number: Some(block_number),
            gas_used,
            success,
            logs,
        })
    }

    async fn block_number(&self) -> LedgerResult<u64> {
        self.check_online()?;
        Ok(self.state().blocks.len() as u64 - 1)
    }

    async fn block_with_transactions(&self, number: u64) -> LedgerResult<Option<LedgerBlock>> {
        self.check_online()?;
        Ok(self.state().blocks.get(number as usize).cloned())
    }

    async fn balance(&self, address: Address) -> LedgerResult<U256> {
        self.check_online()?;
        Ok(self.state().balances.get(&address).copied().unwrap_or_default())
    }

    async fn chain_id(&self) -> LedgerResult<u64> {
        self.check_online()?;
        Ok(Self::CHAIN_ID)
    }
}

fn tx_hash(from: Address, index: usize, payload: &[u8]) -> B256 {
    let mut seed = from.to_vec();
    seed.extend_from_slice(&(index as u64).to_be_bytes());
    seed.extend_from_slice(payload);
    keccak256(&seed)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
