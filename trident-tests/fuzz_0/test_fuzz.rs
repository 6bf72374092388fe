use fuzz_accounts::*;
use trident_fuzz::fuzzing::*;
mod fuzz_accounts;

const MAX_BPS: u64 = 10_000;
const MAX_STRATEGIES: usize = 10;

#[derive(Default, Clone)]
struct StrategyTracker {
    weight_bps: u64,
    /// Vault-side recorded deposits
    total_deposited: u64,
    /// Strategy token balance, including undistributed yield
    balance: u64,
    paused: bool,
}

/// Vault state tracking for invariant checks
#[derive(Default, Clone)]
struct VaultTracker {
    initialized: bool,
    min_liquidity: u64,
    buffer: u64,
    total_shares: u64,
    strategies: Vec<StrategyTracker>,
    /// Assets put in minus assets taken out, plus yield
    net_flows: u64,
}

impl VaultTracker {
    /// Buffer plus each strategy's live balance
    fn total_assets(&self) -> u64 {
        self.held()
    }

    fn total_weight(&self) -> u64 {
        self.strategies.iter().map(|s| s.weight_bps).sum()
    }

    fn held(&self) -> u64 {
        self.strategies
            .iter()
            .fold(self.buffer, |acc, s| acc.saturating_add(s.balance))
    }

    fn rebalance(&mut self) {
        let total = self.total_assets();
        if total <= self.min_liquidity {
            return;
        }
        let deployable = total - self.min_liquidity;

        for i in 0..self.strategies.len() {
            let target = (deployable as u128 * self.strategies[i].weight_bps as u128
                / MAX_BPS as u128) as u64;
            let current = self.strategies[i].total_deposited;

            if target > current {
                if self.strategies[i].paused {
                    continue;
                }
                let assets = (target - current).min(self.buffer);
                self.buffer -= assets;
                self.strategies[i].total_deposited += assets;
                self.strategies[i].balance += assets;
            } else if target < current {
                let assets = (current - target).min(self.strategies[i].balance);
                self.buffer += assets;
                self.strategies[i].total_deposited -= assets;
                self.strategies[i].balance -= assets;
            }
        }
    }

    /// Plan the pull first, then execute it. Returns false when uncovered.
    fn source_liquidity(&mut self, assets: u64) -> bool {
        if self.buffer >= assets {
            return true;
        }
        let mut remaining = assets - self.buffer;
        let mut plan = Vec::new();
        for (i, s) in self.strategies.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let pull = remaining.min(s.total_deposited).min(s.balance);
            if pull > 0 {
                plan.push((i, pull));
                remaining -= pull;
            }
        }
        if remaining > 0 {
            return false;
        }
        for (i, pull) in plan {
            self.strategies[i].total_deposited -= pull;
            self.strategies[i].balance -= pull;
            self.buffer += pull;
        }
        true
    }
}

#[derive(FuzzTestMethods)]
struct FuzzTest {
    trident: Trident,
    fuzz_accounts: AccountAddresses,
    vault_tracker: VaultTracker,
}

#[flow_executor]
impl FuzzTest {
    fn new() -> Self {
        Self {
            trident: Trident::default(),
            fuzz_accounts: AccountAddresses::default(),
            vault_tracker: VaultTracker::default(),
        }
    }

    #[init]
    fn start(&mut self) {
        self.vault_tracker = VaultTracker::default();
    }

    #[flow]
    fn flow_initialize(&mut self) {
        if self.vault_tracker.initialized {
            return;
        }
        self.vault_tracker.initialized = true;
        self.vault_tracker.min_liquidity = rand::random::<u64>() % 10_000;
    }

    /// Register a strategy with a weight that fits the remaining budget
    #[flow]
    fn flow_add_strategy(&mut self) {
        if !self.vault_tracker.initialized
            || self.vault_tracker.strategies.len() >= MAX_STRATEGIES
        {
            return;
        }
        let budget = MAX_BPS - self.vault_tracker.total_weight();
        let weight_bps = rand::random::<u64>() % (budget + 1);

        self.vault_tracker.strategies.push(StrategyTracker {
            weight_bps,
            ..StrategyTracker::default()
        });
    }

    #[flow]
    fn flow_reweight(&mut self) {
        let count = self.vault_tracker.strategies.len();
        if count == 0 {
            return;
        }
        let i = rand::random::<usize>() % count;
        let others = self.vault_tracker.total_weight() - self.vault_tracker.strategies[i].weight_bps;
        self.vault_tracker.strategies[i].weight_bps =
            rand::random::<u64>() % (MAX_BPS - others + 1);
        self.vault_tracker.rebalance();
    }

    #[flow]
    fn flow_toggle_pause(&mut self) {
        let count = self.vault_tracker.strategies.len();
        if count == 0 {
            return;
        }
        let i = rand::random::<usize>() % count;
        let strategy = &mut self.vault_tracker.strategies[i];
        strategy.paused = !strategy.paused;
    }

    #[flow]
    fn flow_deposit(&mut self) {
        if !self.vault_tracker.initialized {
            return;
        }
        let assets = rand::random::<u64>() % 1_000_000_000_000;

        let total_before = self.vault_tracker.total_assets();
        let shares = calculate_shares_floor(assets, total_before, self.vault_tracker.total_shares);

        self.vault_tracker.buffer += assets;
        self.vault_tracker.total_shares += shares;
        self.vault_tracker.net_flows += assets;
        self.vault_tracker.rebalance();

        assert!(
            self.vault_tracker.total_assets() == total_before + assets,
            "Invariant: rebalancing must not change total assets"
        );
    }

    /// Yield lands in a strategy, moves the price, then is harvested into
    /// its recorded deposits without moving it again
    #[flow]
    fn flow_drip_and_harvest(&mut self) {
        let count = self.vault_tracker.strategies.len();
        if count == 0 || self.vault_tracker.total_shares == 0 {
            return;
        }
        let i = rand::random::<usize>() % count;
        let drip = rand::random::<u64>() % 1_000_000;
        let price_before = calculate_assets_floor(
            1_000_000,
            self.vault_tracker.total_assets(),
            self.vault_tracker.total_shares,
        );

        self.vault_tracker.strategies[i].balance += drip;
        self.vault_tracker.net_flows += drip;

        let price_after = calculate_assets_floor(
            1_000_000,
            self.vault_tracker.total_assets(),
            self.vault_tracker.total_shares,
        );
        assert!(
            price_after >= price_before,
            "Invariant: positive yield never lowers the share price"
        );

        let strategy = &mut self.vault_tracker.strategies[i];
        strategy.total_deposited = strategy.balance;
        let price_harvested = calculate_assets_floor(
            1_000_000,
            self.vault_tracker.total_assets(),
            self.vault_tracker.total_shares,
        );
        assert!(
            price_harvested == price_after,
            "Invariant: harvesting does not move the share price"
        );
    }

    #[flow]
    fn flow_withdraw(&mut self) {
        if self.vault_tracker.total_shares == 0 {
            return;
        }
        let shares = (rand::random::<u64>() % self.vault_tracker.total_shares).max(1);
        let assets = calculate_assets_floor(
            shares,
            self.vault_tracker.total_assets(),
            self.vault_tracker.total_shares,
        );

        let before = self.vault_tracker.clone();
        if !self.vault_tracker.source_liquidity(assets) {
            assert!(
                self.vault_tracker.buffer == before.buffer,
                "Invariant: uncovered withdrawal leaves the buffer untouched"
            );
            return;
        }

        self.vault_tracker.buffer -= assets;
        self.vault_tracker.total_shares -= shares;
        self.vault_tracker.net_flows -= assets;

        assert!(
            self.vault_tracker.total_assets() + assets == before.total_assets(),
            "Invariant: withdrawal removes exactly the assets paid out"
        );
    }

    #[end]
    fn end(&mut self) {
        let tracker = &self.vault_tracker;
        if !tracker.initialized {
            return;
        }

        assert!(
            tracker.total_weight() <= MAX_BPS,
            "Invariant: total allocation within 10000 bps"
        );
        assert!(
            tracker.held() == tracker.net_flows,
            "Invariant: every asset is in the buffer or a strategy"
        );
        for strategy in &tracker.strategies {
            assert!(
                strategy.total_deposited <= strategy.balance,
                "Invariant: recorded deposits are backed by strategy balance"
            );
        }
    }
}

/// Shares for given assets (floor rounding - deposit)
fn calculate_shares_floor(assets: u64, total_assets: u64, total_shares: u64) -> u64 {
    let virtual_shares = total_shares as u128 + 1;
    let virtual_assets = total_assets as u128 + 1;
    (assets as u128 * virtual_shares / virtual_assets) as u64
}

/// Assets for given shares (floor rounding - redeem)
fn calculate_assets_floor(shares: u64, total_assets: u64, total_shares: u64) -> u64 {
    let virtual_shares = total_shares as u128 + 1;
    let virtual_assets = total_assets as u128 + 1;
    (shares as u128 * virtual_assets / virtual_shares) as u64
}

fn main() {
    // Run 1000 iterations with up to 100 flows per iteration
    FuzzTest::fuzz(1000, 100);
}
