use std::collections::BTreeMap;
use std::io;

use anyhow::{Context, Result, anyhow, bail};
use maplit::btreemap;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use vmpager::api::Machine;
use vmpager::common::{Pid, VirtAddr};
use vmpager::config::{DEFAULT_BLOCKS, DEFAULT_FRAMES, PagerConfig};
use vmpager::debugger::{Component, DebugLevel, set_debug_level};
use vmpager::{vm_debug, vm_info};

fn commands() -> BTreeMap<&'static str, &'static str> {
    btreemap! {
        "create" => "create <pid>              start tracking a process",
        "extend" => "extend <pid>              grow a process by one page",
        "fault" => "fault <pid> <addr>        deliver a fault by hand",
        "load" => "load <pid> <addr>         read one byte",
        "store" => "store <pid> <addr> <byte> write one byte",
        "write" => "write <pid> <addr> <text> write a string",
        "syslog" => "syslog <pid> <addr> <len> dump resident bytes as hex",
        "destroy" => "destroy <pid>             reclaim a process",
        "frames" => "frames                    show the frame table",
        "stats" => "stats                     show pager counters",
        "validate" => "validate                  cross-check pager tables",
        "help" => "help                      this text",
        "quit" => "quit                      leave",
    }
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter().find_map(|arg| arg.strip_prefix(name))
}

fn parse_number(text: &str) -> Result<usize> {
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.with_context(|| format!("not a number: {text}"))
}

fn arg<'a>(parts: &[&'a str], idx: usize, what: &str) -> Result<&'a str> {
    parts
        .get(idx)
        .copied()
        .ok_or_else(|| anyhow!("missing {what}"))
}

fn pid_arg(parts: &[&str], idx: usize) -> Result<Pid> {
    let raw = parse_number(arg(parts, idx, "pid")?)?;
    Ok(Pid(u32::try_from(raw).context("pid out of range")?))
}

fn addr_arg(parts: &[&str], idx: usize) -> Result<VirtAddr> {
    Ok(VirtAddr(parse_number(arg(parts, idx, "address")?)?))
}

/// Runs one command line. Returns false when the session should end.
fn execute(machine: &Machine, line: &str) -> Result<bool> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&command) = parts.first() else {
        return Ok(true);
    };

    match command {
        "quit" | "exit" => return Ok(false),
        "help" => {
            for usage in commands().values() {
                println!("  {usage}");
            }
        }
        "create" => {
            let pid = pid_arg(&parts, 1)?;
            machine.spawn(pid)?;
            println!("created {pid}");
        }
        "extend" => {
            let pid = pid_arg(&parts, 1)?;
            println!("{}", machine.extend(pid)?);
        }
        "fault" => {
            let pid = pid_arg(&parts, 1)?;
            let addr = addr_arg(&parts, 2)?;
            let pager = machine.pager();
            // a fault on memory never extended would abort the pager
            let extended = pager.with_core(|core| {
                core.page_state(pid, addr)
                    .is_some_and(|state| state.is_allocated())
            });
            if !extended {
                bail!("{pid} has no extended page at {addr}");
            }
            pager.fault(pid, addr);
            let state = pager.with_core(|core| core.page_state(pid, addr));
            println!("{:?}", state);
        }
        "load" => {
            let pid = pid_arg(&parts, 1)?;
            let addr = addr_arg(&parts, 2)?;
            println!("{:02x}", machine.load(pid, addr)?);
        }
        "store" => {
            let pid = pid_arg(&parts, 1)?;
            let addr = addr_arg(&parts, 2)?;
            let byte = u8::try_from(parse_number(arg(&parts, 3, "byte")?)?)
                .context("byte out of range")?;
            machine.store(pid, addr, byte)?;
        }
        "write" => {
            let pid = pid_arg(&parts, 1)?;
            let addr = addr_arg(&parts, 2)?;
            let text = parts.get(3..).map(|rest| rest.join(" ")).unwrap_or_default();
            machine.write_bytes(pid, addr, text.as_bytes())?;
        }
        "syslog" => {
            let pid = pid_arg(&parts, 1)?;
            let addr = addr_arg(&parts, 2)?;
            let len = parse_number(arg(&parts, 3, "length")?)?;
            machine.syslog(pid, addr, len, &mut io::stdout())?;
        }
        "destroy" => {
            let pid = pid_arg(&parts, 1)?;
            machine.exit(pid)?;
            println!("destroyed {pid}");
        }
        "frames" => machine.pager().with_core(|core| {
            let hand = core.frames().clock_hand();
            for (id, frame) in core.frames().iter() {
                let owner = frame
                    .owner()
                    .map(|o| format!("{} page {}", o.pid, o.page))
                    .unwrap_or_else(|| "free".to_string());
                println!(
                    "{}{:>10}  {:<16} ref={} vis={} dirty={}",
                    if id == hand { ">" } else { " " },
                    id.to_string(),
                    owner,
                    frame.referenced() as u8,
                    frame.visible() as u8,
                    frame.dirty() as u8,
                );
            }
        }),
        "stats" => println!("{}", machine.stats()),
        "validate" => match machine.pager().validate() {
            Ok(()) => println!("ok"),
            Err(violation) => println!("{:?}", violation),
        },
        other => bail!("unknown command {other:?}, try help"),
    }

    Ok(true)
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let debug_level = flag(&args, "--debug=")
        .and_then(DebugLevel::parse)
        .unwrap_or(DebugLevel::Off);
    set_debug_level(debug_level);

    let frames = flag(&args, "--frames=")
        .map(parse_number)
        .transpose()?
        .unwrap_or(DEFAULT_FRAMES);
    let blocks = flag(&args, "--blocks=")
        .map(parse_number)
        .transpose()?
        .unwrap_or(DEFAULT_BLOCKS);

    let machine = Machine::new(PagerConfig::new(frames, blocks))?;
    let mut editor = DefaultEditor::new()?;
    vm_info!(Component::Cli, "debug level {:?}", debug_level);

    println!("vmpager: {frames} frames, {blocks} blocks");
    println!("Type help for commands. Ctrl+D to exit");

    loop {
        match editor.readline("vm> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                vm_debug!(Component::Cli, "> {}", line);

                match execute(&machine, line) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(error) => println!("error: {error:#}"),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        }
    }

    Ok(())
}
