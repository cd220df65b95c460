use color_print::cformat;

use crate::{
    assembler::{Assembly, Listed},
    parser::Origin,
    symbol::{Name, State},
};

const RULE: &str = "---------------+---------------------------------------------------------";

/// `[LOC ] CODE     | LINE: source`
pub fn row(listed: &Listed) -> String {
    let stmt = &listed.stmt;
    if stmt.comment {
        return cformat!("{:15}| {:>4}: <y>{}</>", "", stmt.line, stmt.raw);
    }
    let loc = stmt
        .addr()
        .map(|addr| format!("{:04X}", addr))
        .unwrap_or_else(|| "????".to_string());
    let code: String = listed.code.iter().map(|b| format!("{:02X}", b)).collect();
    let code = if code.len() > 8 {
        format!("{}..", &code[..6])
    } else {
        code
    };
    let source = match stmt.origin {
        Origin::Literal => cformat!("<c>{}</>", stmt.raw),
        Origin::Source => {
            let label = stmt.label.as_deref().unwrap_or("");
            let op = if stmt.extended {
                format!("+{}", stmt.op)
            } else {
                stmt.op.clone()
            };
            cformat!(
                "<g>{:8}</><b>{:8}</>{}",
                label,
                op,
                stmt.operands.join(",")
            )
        }
    };
    format!("[{}] {:8}| {:>4}: {}", loc, code, stmt.line, source)
}

pub fn symbols(assembly: &Assembly) -> Vec<String> {
    assembly
        .symbols
        .iter()
        .map(|(name, symbol)| {
            let addr = match symbol.state {
                State::Resolved(addr) => format!("{:04X}", addr),
                State::Pending(_) => "????".to_string(),
            };
            match name {
                Name::Label(_) => cformat!("[{}] <g>{}</>", addr, name),
                Name::Literal(pool, _) => cformat!("[{}] <c>{}</> (pool {})", addr, name, pool),
            }
        })
        .collect()
}

pub fn dump(assembly: &Assembly) {
    println!("{}", RULE);
    for listed in &assembly.listing {
        println!("{}", row(listed));
    }
    println!("{}", RULE);
    for line in symbols(assembly) {
        println!("{}", line);
    }
    println!("{}", RULE);
}
