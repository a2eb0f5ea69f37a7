mod logger;

use std::fs;
use std::io::{self, Write};
use std::process;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use lexopt::{Arg, Parser, ValueExt};
use lpcre2_core::options::{self, OptionKind};
use lpcre2_core::{lua, Config, IterStart, Pattern};
use mlua::Lua;
use serde_json::{json, Value};

const USAGE: &str = "\
usage:
  lpcre2 run <script.lua>
  lpcre2 match [--offset N] [--whole] [--opt NAME]... [--] <pattern> <subject>
  lpcre2 sub [--global] [--opt NAME]... [--] <pattern> <subject> <replacement>

NAME is a published option name such as PCRE2_CASELESS. Arguments after `--`
are taken as positionals even when they look like flags.";

/// Positional arguments plus the flags shared by `match` and `sub`.
#[derive(Debug, Default)]
struct Args {
    positional: Vec<String>,
    offset: usize,
    whole: bool,
    global: bool,
    compile_opts: u32,
    runtime_opts: u32,
}

/// Parses the next `p.value()` as `T`, naming `flag` in any error.
fn parse<T>(p: &mut Parser, flag: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let value = p.value().context(flag)?;
    let value = value.string().context(flag)?;
    value.parse().with_context(|| format!("{}: bad value {:?}", flag, value))
}

fn parse_args(p: &mut Parser, runtime_kind: OptionKind) -> anyhow::Result<Args> {
    let mut args = Args::default();
    while let Some(arg) = p.next()? {
        match arg {
            Arg::Long("offset") if runtime_kind == OptionKind::Match => {
                args.offset = parse(p, "--offset")?;
            }
            Arg::Long("whole") if runtime_kind == OptionKind::Match => args.whole = true,
            Arg::Long("global") if runtime_kind == OptionKind::Substitute => args.global = true,
            Arg::Long("opt") => {
                let name = p.value().context("--opt")?.string()?;
                let entry = options::TABLE
                    .iter()
                    .find(|e| e.name == name.as_str())
                    .ok_or_else(|| anyhow!("unknown option {}", name))?;
                match entry.kind {
                    OptionKind::Compile => args.compile_opts |= entry.value,
                    _ => args.runtime_opts |= entry.value,
                }
            }
            Arg::Value(v) => args.positional.push(v.string()?),
            arg => return Err(arg.unexpected().into()),
        }
    }
    let unused = options::names(runtime_kind, args.runtime_opts & !options::mask(runtime_kind));
    if !unused.is_empty() {
        log::warn!("options ignored here: {}", unused.join(", "));
    }
    Ok(args)
}

fn run_script(p: &mut Parser) -> anyhow::Result<()> {
    let path = match p.next()? {
        Some(Arg::Value(v)) => v.string()?,
        Some(arg) => return Err(arg.unexpected().into()),
        None => bail!("run: missing script path"),
    };
    if let Some(arg) = p.next()? {
        return Err(arg.unexpected().into());
    }
    let source = fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let config = Config::from_env();
    let lua = Lua::new();
    lua::preload(&lua, &config).map_err(|e| anyhow!("{}", e))?;
    lua::register_global(&lua, &config).map_err(|e| anyhow!("{}", e))?;
    lua.load(source.as_str())
        .set_name(format!("@{}", path))
        .exec()
        .map_err(|e| anyhow!("{}", e))
}

fn group_json(
    m: &lpcre2_core::MatchResult,
    index: usize,
    text: Option<&[u8]>,
) -> anyhow::Result<Value> {
    let span = m.span(index as i64)?;
    Ok(json!({
        "index": index,
        "start": span.map(|s| s.offset),
        "end": span.map(|s| s.end()),
        "text": text.map(|t| String::from_utf8_lossy(t).into_owned()),
    }))
}

fn run_match(p: &mut Parser) -> anyhow::Result<()> {
    let args = parse_args(p, OptionKind::Match)?;
    let [pattern, subject] = args.positional.as_slice() else {
        bail!("match: expected <pattern> <subject>");
    };
    let config = Config::from_env();
    let compiled = Arc::new(Pattern::compile_with(pattern.as_bytes(), args.compile_opts, &config)?);
    let subject = subject.as_bytes();

    let out = match compiled.match_at(subject, args.offset, args.runtime_opts)? {
        None => Value::Null,
        Some(m) => {
            let start = if args.whole { IterStart::WholeMatch } else { config.iter_start };
            let whole = group_json(&m, 0, m.group(subject, 0)?)?;
            let groups = m
                .iter_from(subject, start)?
                .map(|g| {
                    let (i, text) = g?;
                    group_json(&m, i, text)
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            json!({
                "group_count": m.group_count(),
                "match": whole,
                "groups": groups,
            })
        }
    };
    println!("{}", out);
    Ok(())
}

fn run_sub(p: &mut Parser) -> anyhow::Result<()> {
    let args = parse_args(p, OptionKind::Substitute)?;
    let [pattern, subject, replacement] = args.positional.as_slice() else {
        bail!("sub: expected <pattern> <subject> <replacement>");
    };
    let config = Config::from_env();
    let compiled = Pattern::compile_with(pattern.as_bytes(), args.compile_opts, &config)?;
    let mut opts = args.runtime_opts;
    if args.global {
        opts |= options::SUBSTITUTE_GLOBAL;
    }
    let out = compiled.substitute(subject.as_bytes(), replacement.as_bytes(), opts)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&out)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Dispatches on the subcommand. `Ok(false)` means no command was given.
fn run(p: &mut Parser) -> anyhow::Result<bool> {
    let cmd = match p.next()? {
        None => return Ok(false),
        Some(Arg::Short('h')) | Some(Arg::Long("help")) => {
            println!("{}", USAGE);
            return Ok(true);
        }
        Some(Arg::Value(cmd)) => cmd.string()?,
        Some(arg) => return Err(arg.unexpected().into()),
    };
    match cmd.as_str() {
        "run" => run_script(p)?,
        "match" => run_match(p)?,
        "sub" => run_sub(p)?,
        unk => bail!("unrecognized command '{}'\n\n{}", unk, USAGE),
    }
    Ok(true)
}

fn main() {
    if let Err(e) = logger::Logger::init_from_env() {
        eprintln!("failed to initialize logger: {}", e);
    }
    match run(&mut Parser::from_env()) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
        Err(e) => {
            eprintln!("lpcre2: {:#}", e);
            process::exit(1);
        }
    }
}
