use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use iscn_documents::registry_with_hash;
use iscn_schema::{CodecRegistry, Link, SchemaObject};
use iscn_store::{DagWalker, FsBlockStore, Walk};
use iscn_types::{Cid, Fields};
use serde_json::{json, Value as Json};

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(&cli.config)?;
    let format = cli.format;
    match cli.command {
        Command::Encode(args) => cmd_encode(&Session::open(config)?, args, format),
        Command::Decode(args) => cmd_decode(&Session::open(config)?, args, format),
        Command::Resolve(args) => cmd_resolve(&Session::open(config)?, args, format),
        Command::Links(args) => cmd_links(&Session::open(config)?, args, format),
        Command::Refs(args) => cmd_refs(&Session::open(config)?, args, format),
        Command::Schemas => cmd_schemas(&registry_with_hash(config.hash)?, format),
        Command::Config => cmd_config(&config, format),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Registry and block store built from the configuration.
pub struct Session {
    pub config: CliConfig,
    pub registry: CodecRegistry,
    pub store: FsBlockStore,
}

impl Session {
    pub fn open(config: CliConfig) -> anyhow::Result<Self> {
        let registry = registry_with_hash(config.hash)?;
        let store = FsBlockStore::open(&config.store_dir)
            .with_context(|| format!("opening block store {}", config.store_dir.display()))?;
        Ok(Self {
            config,
            registry,
            store,
        })
    }

    fn walker(&self) -> DagWalker<'_, FsBlockStore> {
        DagWalker::new(&self.registry, &self.store)
    }

    /// Encode the JSON document in `path` as `kind` and store it.
    pub fn encode_file(&self, kind: &str, version: u64, path: &Path) -> anyhow::Result<SchemaObject> {
        let codec = self.registry.lookup_by_name(kind).with_context(|| {
            let known: Vec<_> = self
                .registry
                .codecs()
                .into_iter()
                .filter_map(|c| self.registry.schema_name(c))
                .collect();
            format!("unknown kind {kind:?}, expected one of: {}", known.join(", "))
        })?;
        let fields = read_fields(path)?;
        let document = self.registry.encode(codec, version, &fields)?;
        self.walker().put_document(&document)?;
        Ok(document)
    }

    pub fn load(&self, cid: &str) -> anyhow::Result<SchemaObject> {
        Ok(self.walker().load(&parse_cid(cid)?)?)
    }

    pub fn walk(&self, cid: &str, path: &str) -> anyhow::Result<(Walk, Json)> {
        let walk = self.walker().walk(&parse_cid(cid)?, path)?;
        let json = walk.resolve()?.node.to_json();
        Ok((walk, json))
    }

    pub fn refs(&self, cid: &str) -> anyhow::Result<Vec<Cid>> {
        Ok(self.walker().reachable(&parse_cid(cid)?)?)
    }
}

fn parse_cid(s: &str) -> anyhow::Result<Cid> {
    s.parse().with_context(|| format!("invalid CID {s:?}"))
}

fn read_fields(path: &Path) -> anyhow::Result<Fields> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let json: Json =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    match json {
        Json::Object(map) => Ok(Fields::from_json_map(&map)),
        other => bail!("{} must hold a JSON object, found {}", path.display(), kind_of(&other)),
    }
}

fn kind_of(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

fn print_json(json: &Json, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(json)?
    } else {
        serde_json::to_string(json)?
    };
    println!("{text}");
    Ok(())
}

fn links_json(links: &[Link]) -> Json {
    Json::Array(
        links
            .iter()
            .map(|l| json!({"name": l.name, "cid": l.cid.to_string()}))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_encode(session: &Session, args: EncodeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let document = session.encode_file(&args.kind, args.version, &args.file)?;
    let cid = document.cid().context("encoded document has no CID")?;
    let size = document.raw_data().map_or(0, <[u8]>::len);
    match format {
        OutputFormat::Json => print_json(
            &json!({
                "cid": cid.to_string(),
                "kind": document.name(),
                "version": document.version(),
                "bytes": size,
            }),
            session.config.pretty,
        ),
        OutputFormat::Text => {
            println!(
                "{} Encoded {} v{} ({} bytes)",
                "✓".green().bold(),
                document.name().bold(),
                document.version(),
                size
            );
            println!("  CID: {}", cid.to_string().yellow());
            Ok(())
        }
    }
}

fn cmd_decode(session: &Session, args: DecodeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let document = session.load(&args.cid)?;
    if format == OutputFormat::Text {
        println!("{} {}", document.to_string().cyan(), args.cid.dimmed());
    }
    print_json(&document.get_data(), session.config.pretty)
}

fn cmd_resolve(session: &Session, args: ResolveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (walk, value) = session.walk(&args.cid, &args.path)?;
    match format {
        OutputFormat::Json => print_json(
            &json!({
                "hops": walk.hops.iter().map(Cid::to_string).collect::<Vec<_>>(),
                "value": value,
            }),
            session.config.pretty,
        ),
        OutputFormat::Text => {
            for (i, hop) in walk.hops.iter().enumerate() {
                let marker = if i == 0 { "root" } else { "  ->" };
                println!("{} {}", marker.dimmed(), hop.to_string().yellow());
            }
            print_json(&value, session.config.pretty)
        }
    }
}

fn cmd_links(session: &Session, args: LinksArgs, format: OutputFormat) -> anyhow::Result<()> {
    let links = session.load(&args.cid)?.links();
    match format {
        OutputFormat::Json => print_json(&links_json(&links), session.config.pretty),
        OutputFormat::Text => {
            if links.is_empty() {
                println!("No links.");
            }
            for link in &links {
                println!("  {:<16} {}", link.name.bold(), link.cid.to_string().yellow());
            }
            Ok(())
        }
    }
}

fn cmd_refs(session: &Session, args: RefsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let cids = session.refs(&args.cid)?;
    match format {
        OutputFormat::Json => print_json(
            &Json::Array(cids.iter().map(|c| Json::String(c.to_string())).collect()),
            session.config.pretty,
        ),
        OutputFormat::Text => {
            for cid in &cids {
                let name = session.registry.schema_name(cid.codec()).unwrap_or("?");
                println!("  {:<14} {}", name.cyan(), cid.to_string().yellow());
            }
            println!("{} {} documents reachable", "✓".green(), cids.len());
            Ok(())
        }
    }
}

fn schema_rows(registry: &CodecRegistry) -> Vec<(String, u64, usize)> {
    registry
        .codecs()
        .into_iter()
        .map(|codec| {
            let name = registry.schema_name(codec).unwrap_or_default().to_string();
            (name, codec, registry.version_count(codec))
        })
        .collect()
}

fn cmd_schemas(registry: &CodecRegistry, format: OutputFormat) -> anyhow::Result<()> {
    let rows = schema_rows(registry);
    match format {
        OutputFormat::Json => {
            let json: Vec<Json> = rows
                .iter()
                .map(|(name, codec, versions)| {
                    json!({"name": name, "codec": codec, "versions": versions})
                })
                .collect();
            print_json(&Json::Array(json), true)
        }
        OutputFormat::Text => {
            for (name, codec, versions) in &rows {
                println!("  {:<14} {:#06x}  v1..v{}", name.bold(), codec, versions);
            }
            Ok(())
        }
    }
}

fn cmd_config(config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(config)?, true),
        OutputFormat::Text => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
