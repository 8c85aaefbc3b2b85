use structopt::StructOpt;

use dnindex::{
    config::Config,
    dn::{self, Dn},
    index::{flat::FlatIndex, hier::HierIndex, DnIndex, NewEntry},
    store::LmdbStore,
    types::{Id, Prefix},
    Result, Variant,
};

/// Manual exerciser for a DN↔ID index backed by an on-disk LMDB
/// environment. Not part of the library's public contract.
#[derive(Clone, StructOpt)]
pub struct Opt {
    #[structopt(long = "config", help = "path to the backend's TOML config file")]
    config: String,

    #[structopt(subcommand)]
    subcmd: SubCommand,
}

#[derive(Clone, StructOpt)]
pub enum SubCommand {
    /// Map a DN to a fresh id, linking it under its parent DN.
    Add {
        #[structopt(long = "dn")]
        dn: String,

        #[structopt(long = "parent")]
        parent: Option<String>,

        #[structopt(long = "id")]
        id: Id,
    },
    /// Exact-match a DN to its id.
    Lookup {
        #[structopt(long = "dn")]
        dn: String,
    },
    /// Longest-prefix match a DN.
    Matched {
        #[structopt(long = "dn")]
        dn: String,
    },
    /// List the direct children of a DN.
    Children {
        #[structopt(long = "dn")]
        dn: String,
    },
    /// Dump the full subtree rooted at a DN.
    Tree {
        #[structopt(long = "dn")]
        dn: String,
    },
}

fn main() {
    env_logger::init();
    let opts = Opt::from_iter(std::env::args_os());

    if let Err(err) = run(opts) {
        println!("dnidx: error: {}", err);
        std::process::exit(1);
    }
}

fn run(opts: Opt) -> Result<()> {
    let text = std::fs::read_to_string(&opts.config)
        .map_err(|e| dnindex::Error::IoError(format!("{}:{}", file!(), line!()), e.to_string()))?;
    let config = Config::parse_str(&text)?;

    let store = LmdbStore::open(&config.env_path, config.map_size)?;

    match config.variant {
        Variant::Flat => run_flat(&store, &config, opts.subcmd),
        Variant::Hierarchical => run_hier(&store, &config, opts.subcmd),
    }
}

fn run_flat(store: &LmdbStore, config: &Config, subcmd: SubCommand) -> Result<()> {
    let index = FlatIndex::new(&store, config.suffix.clone());
    match subcmd {
        SubCommand::Add { dn, parent, id } => {
            let mut txn = store.begin_rw()?;
            let pdn = parent.map(Dn::new);
            let entry = NewEntry {
                ndn: Dn::new(dn),
                id,
                rdn: String::new(),
            };
            index.add(&mut txn, pdn.as_ref(), &entry)?;
            txn.commit()
        }
        SubCommand::Lookup { dn } => {
            let txn = store.begin_ro()?;
            println!("{}", index.lookup(&txn, &Dn::new(dn))?);
            Ok(())
        }
        SubCommand::Matched { dn } => {
            let txn = store.begin_ro()?;
            print_matched(index.lookup_matched(&txn, &Dn::new(dn))?)
        }
        SubCommand::Children { dn } => {
            let txn = store.begin_ro()?;
            let ids = index.descendants(&txn, &Dn::new(dn), Prefix::One)?;
            println!("{:?}", ids.to_vec());
            Ok(())
        }
        SubCommand::Tree { dn } => {
            let txn = store.begin_ro()?;
            let ids = index.descendants(&txn, &Dn::new(dn), Prefix::Subtree)?;
            match ids.len() {
                Some(_) => println!("{:?}", ids.to_vec()),
                None => println!("ALL"),
            }
            Ok(())
        }
    }
}

fn run_hier(store: &LmdbStore, config: &Config, subcmd: SubCommand) -> Result<()> {
    let txn = store.begin_ro()?;
    let index = HierIndex::open(&store, &txn, config.suffix.clone())?;
    txn.commit()?;

    match subcmd {
        SubCommand::Add { dn, parent, id } => {
            let mut txn = store.begin_rw()?;
            let pdn = parent.map(Dn::new);
            let ndn = Dn::new(dn);
            let rdn = dn::rdn_of(&ndn).unwrap_or_default();
            let entry = NewEntry { ndn, id, rdn };
            index.add(&mut txn, pdn.as_ref(), &entry)?;
            txn.commit()
        }
        SubCommand::Lookup { dn } => {
            let txn = store.begin_ro()?;
            println!("{}", index.lookup(&txn, &Dn::new(dn))?);
            Ok(())
        }
        SubCommand::Matched { dn } => {
            let txn = store.begin_ro()?;
            print_matched(index.lookup_matched(&txn, &Dn::new(dn))?)
        }
        SubCommand::Children { dn } => {
            let txn = store.begin_ro()?;
            let ids = index.descendants(&txn, &Dn::new(dn), Prefix::One)?;
            println!("{:?}", ids.to_vec());
            Ok(())
        }
        SubCommand::Tree { dn } => {
            let txn = store.begin_ro()?;
            let ids = index.descendants(&txn, &Dn::new(dn), Prefix::Subtree)?;
            match ids.len() {
                Some(_) => println!("{:?}", ids.to_vec()),
                None => println!("ALL"),
            }
            Ok(())
        }
    }
}

fn print_matched(m: dnindex::Matched) -> Result<()> {
    match m.matched {
        Some(dn) => println!("{} matched={}", m.id, dn),
        None => println!("{}", m.id),
    }
    Ok(())
}
