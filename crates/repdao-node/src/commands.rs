//! Command implementations.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use repdao_governance::{GovernanceParams, GovernanceService, ManualClock, MemberInfo, VoteOption};
use repdao_types::Address;
use tracing::info;

use crate::config::NodeConfig;
use crate::snapshot;

/// Main CLI.
#[derive(Parser, Debug)]
#[command(name = "repdao-node")]
#[command(about = "RepDAO - community risk ratings for websites")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Config file path
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Governance state file (overrides config)
    #[arg(long, global = true, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Log level (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the four-member walkthrough in memory
    Demo,

    /// Join the DAO
    Join {
        /// Dev account index or 0x address
        #[arg(long)]
        from: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Submit a website for rating
    Submit {
        #[arg(long)]
        from: String,
        #[arg(long)]
        url: String,
    },

    /// Vote on a proposal
    Vote {
        #[arg(long)]
        from: String,
        #[arg(long)]
        proposal: u64,
        /// 0-3 or Scam|HighRisk|Normal|Safe
        #[arg(long)]
        option: String,
    },

    /// Finalize a proposal and pay rewards
    Process {
        #[arg(long)]
        from: String,
        #[arg(long)]
        proposal: u64,
    },

    /// Show one proposal
    Proposal {
        #[arg(long)]
        id: u64,
    },

    /// List all proposals
    Proposals,

    /// Show one member
    Member {
        /// Dev account index or 0x address
        #[arg(long)]
        account: String,
    },

    /// List all members
    Members,

    /// List development accounts
    Accounts,

    /// Write the effective configuration to a TOML file
    InitConfig {
        #[arg(long, default_value = "repdao.toml")]
        path: PathBuf,
    },

    /// Discard all governance state
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Execute a command.
pub fn execute(command: Commands, config: &NodeConfig) -> anyhow::Result<()> {
    let accounts = config.dev_accounts;
    match command {
        Commands::Demo => run_demo(config.governance).map(|_| ()),
        Commands::Accounts => {
            for i in 0..accounts {
                println!("{:>3}  {}", i, Address::dev_account(i));
            }
            Ok(())
        }
        Commands::InitConfig { path } => {
            config.to_file(&path)?;
            println!("Configuration written to {}", path.display());
            Ok(())
        }
        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to reset without --yes; this deletes all members and proposals");
            }
            let _lock = snapshot::StateLock::acquire(&config.state_file)?;
            if snapshot::reset(&config.state_file)? {
                println!("Governance state cleared: {}", config.state_file.display());
            } else {
                println!("Nothing to clear at {}", config.state_file.display());
            }
            Ok(())
        }
        command => {
            let _lock = snapshot::StateLock::acquire(&config.state_file)?;
            let svc = snapshot::load(&config.state_file, config.governance)?;
            let mutated = run_against(&svc, command, accounts)?;
            if mutated {
                snapshot::save(&svc, &config.state_file)?;
            }
            Ok(())
        }
    }
}

/// Run a state command. Returns true if the state changed.
fn run_against(svc: &GovernanceService, command: Commands, accounts: u32) -> anyhow::Result<bool> {
    match command {
        Commands::Join { from, name } => {
            let caller = resolve_account(&from, accounts)?;
            let member = svc.join(caller, name.as_deref())?;
            println!("{} joined as {} with {} tokens", caller, member.role, member.token_balance);
            Ok(true)
        }
        Commands::Submit { from, url } => {
            let caller = resolve_account(&from, accounts)?;
            let id = svc.submit(caller, &url)?;
            println!("Submitted {} as proposal {}", url, id);
            Ok(true)
        }
        Commands::Vote { from, proposal, option } => {
            let caller = resolve_account(&from, accounts)?;
            let choice = svc.vote(caller, proposal, parse_option(&option)?)?;
            println!("{} voted {} on proposal {}", caller, choice, proposal);
            Ok(true)
        }
        Commands::Process { from, proposal } => {
            let caller = resolve_account(&from, accounts)?;
            let fin = svc.process(caller, proposal)?;
            println!("Proposal {} finalized as {}", proposal, fin.outcome);
            println!("  proposer {} +{}", fin.proposer, fin.proposer_reward);
            for voter in &fin.rewarded_voters {
                println!("  voter    {} +{}", voter, fin.voter_reward);
            }
            Ok(true)
        }
        Commands::Proposal { id } => {
            print_proposal(svc, id)?;
            Ok(false)
        }
        Commands::Proposals => {
            for id in 0..svc.proposal_count() {
                print_proposal(svc, id)?;
            }
            Ok(false)
        }
        Commands::Member { account } => {
            print_member(svc, resolve_account(&account, accounts)?);
            Ok(false)
        }
        Commands::Members => {
            println!("Total members: {}", svc.member_count());
            for id in svc.all_members() {
                print_member(svc, id);
            }
            Ok(false)
        }
        Commands::Demo
        | Commands::Accounts
        | Commands::InitConfig { .. }
        | Commands::Reset { .. } => Ok(false),
    }
}

/// Dev account index or `0x` address.
pub fn resolve_account(s: &str, accounts: u32) -> anyhow::Result<Address> {
    if let Ok(index) = s.parse::<u32>() {
        if index >= accounts {
            anyhow::bail!("Dev account {} out of range (0..{})", index, accounts);
        }
        return Ok(Address::dev_account(index));
    }
    Address::from_str(s).map_err(|e| anyhow::anyhow!("Invalid account '{}': {}", s, e))
}

/// Raw numbers pass through untouched so the core reports out-of-range
/// options itself; names are mapped to their encoding.
pub fn parse_option(s: &str) -> anyhow::Result<u8> {
    if let Ok(raw) = s.parse::<u8>() {
        return Ok(raw);
    }
    Ok(VoteOption::from_str(s)?.into())
}

fn print_proposal(svc: &GovernanceService, id: u64) -> anyhow::Result<()> {
    let p = svc.proposal(id)?;
    let votes = p.tally.counts();
    println!(
        "Proposal {} ({}): Status = {}, Processed = {}",
        p.id,
        p.url,
        p.status_label(),
        p.processed
    );
    println!(
        "  Votes: Scam={}, HighRisk={}, Normal={}, Safe={}",
        votes[0], votes[1], votes[2], votes[3]
    );
    Ok(())
}

fn print_member(svc: &GovernanceService, id: Address) {
    println!("{}", member_line(id, &svc.member_info(&id)));
}

fn member_line(id: Address, info: &MemberInfo) -> String {
    if !info.is_member {
        return format!("{}: not a member", id.short());
    }
    format!(
        "{} [{}] {}: Tokens={}, Proposals={}, Votes={}",
        id.short(),
        info.role,
        info.name.as_deref().unwrap_or("-"),
        info.token_balance,
        info.proposals_submitted,
        info.votes_count
    )
}

/// Fixed start time so walkthrough output is reproducible.
const DEMO_START: u64 = 1_700_000_000;

/// The walkthrough: four members join, the admin submits a site, three
/// members rate it, the admin finalizes it.
fn run_demo(params: GovernanceParams) -> anyhow::Result<GovernanceService> {
    let clock = Arc::new(ManualClock::new(DEMO_START));
    let svc = GovernanceService::with_clock(params, clock.clone())?;
    let account = Address::dev_account;

    println!("\n--- 1. Members Joining ---");
    for i in 0..4 {
        let member = svc.join(account(i), None)?;
        println!("Account {} joined DAO as {}", account(i), member.role);
    }

    println!("\n--- 2. Submit Proposal ---");
    clock.advance(60);
    let id = svc.submit(account(0), "http://suspicious-site.com")?;
    println!("Account {} submitted proposal {}", account(0), id);

    println!("\n--- 3. Voting ---");
    clock.advance(60);
    for (i, option) in [(1, VoteOption::Scam), (2, VoteOption::Scam), (3, VoteOption::HighRisk)] {
        svc.vote(account(i), id, option.into())?;
        println!("Account {} voted {} on proposal {}", account(i), option, id);
    }

    println!("\n--- 4. Status Before Finalization ---");
    print_proposal(&svc, id)?;

    println!("\n--- 5. Process Proposal ---");
    let fin = svc.process(account(0), id)?;
    info!("Demo proposal {} finalized as {}", id, fin.outcome);

    println!("\n--- 6. Final Status & Rewards ---");
    print_proposal(&svc, id)?;
    for i in 0..4 {
        print_member(&svc, account(i));
    }
    Ok(svc)
}
