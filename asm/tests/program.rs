use arch::op::SICXE;
use xeasm::{assemble, Error, Level, Mode};

const PROG: &str = "\
PROG\tSTART\t0
FIRST\tLDA\tFIVE
\tSTA\tALPHA
FIVE\tWORD\t5
ALPHA\tRESW\t1
\tEND\tFIRST
";

const COPY: &str = "\
COPY\tSTART\t0
FIRST\tSTL\tRETADR
\tLDB\t#LENGTH
\tBASE\tLENGTH
CLOOP\t+JSUB\tRDREC
\tLDA\tLENGTH
\tCOMP\t#0
\tJEQ\tENDFIL
\t+JSUB\tWRREC
\tJ\tCLOOP
ENDFIL\tLDA\tEOF
\tSTA\tBUFFER
\tLDA\t#3
\tSTA\tLENGTH
\t+JSUB\tWRREC
\tJ\t@RETADR
EOF\tBYTE\tC'EOF'
RETADR\tRESW\t1
LENGTH\tRESW\t1
BUFFER\tRESB\t4096
.
.\tsubroutine to read record into buffer
.
RDREC\tCLEAR\tX
\tCLEAR\tA
\tCLEAR\tS
\t+LDT\t#4096
RLOOP\tTD\tINPUT
\tJEQ\tRLOOP
\tRD\tINPUT
\tCOMPR\tA,S
\tJEQ\tEXIT
\tSTCH\tBUFFER,X
\tTIXR\tT
\tJLT\tRLOOP
EXIT\tSTX\tLENGTH
\tRSUB
INPUT\tBYTE\tX'F1'
.
.\tsubroutine to write record from buffer
.
WRREC\tCLEAR\tX
\tLDT\tLENGTH
WLOOP\tTD\tOUTPUT
\tJEQ\tWLOOP
\tLDCH\tBUFFER,X
\tWD\tOUTPUT
\tTIXR\tT
\tJLT\tWLOOP
\tRSUB
OUTPUT\tBYTE\tX'05'
\tEND\tFIRST
";

const COPY_OBJ: [&str; 11] = [
    "HCOPY  000000001077",
    "T 000000 06 17202D 69202D",
    "T 000006 20 4B101036 032026 290000 332007 4B10105D 3F2FEC 032010 0F2016 010003 0F200D",
    "T 000026 0A 4B10105D 3E2003 454F46",
    "T 001036 20 B410 B400 B440 75101000 E32019 332FFA DB2013 A004 332008 57C003 B850 3B2FEA",
    "T 001056 20 134000 4F0000 F1 B410 774000 E32011 332FFA 53C003 DF2008 B850 3B2FEF 4F0000",
    "T 001076 01 05",
    "M00000705",
    "M00001405",
    "M00002705",
    "E000000",
];

const LITERALS: &str = "\
LIT\tSTART\t256
\tLDA\t=C'EOF'
\tLDA\t=X'05'
\tLDA\t=C'EOF'
\tLTORG
\tLDA\t=C'EOF'
\tEND
";

fn lines(source: &str, mode: Mode) -> Vec<String> {
    let assembly = assemble(source, &SICXE, mode).unwrap();
    for diag in &assembly.diags {
        println!("{:?}: {} (line {})", diag.level, diag.msg, diag.line);
    }
    assert!(!assembly.has_error());
    let text = assembly.program.to_string();
    println!("{}", text);
    text.lines().map(str::to_string).collect()
}

fn assert(source: &str, mode: Mode, expects: &[&str]) {
    assert_eq!(lines(source, mode), expects);
}

fn fatal(source: &str, mode: Mode) -> Error {
    match assemble(source, &SICXE, mode) {
        Ok(assembly) => panic!("assembled:\n{}", assembly.program),
        Err(mut failed) => failed.diags.pop().and_then(|d| d.error).unwrap(),
    }
}

macro_rules! case {
    ($name:ident, $source:expr, $expects:expr) => {
        #[test]
        fn $name() {
            assert($source, Mode::TwoPass, &$expects);
        }
    };
}

case!(
    end_to_end,
    PROG,
    [
        "HPROG  00000000000C",
        "T 000000 09 032003 0F2003 000005",
        "E000000"
    ]
);

case!(copy, COPY, COPY_OBJ);

case!(
    literal_pools,
    LITERALS,
    [
        "HLIT   000100000013",
        "T 000100 09 032006 032006 032000",
        "T 000109 0A 454F46 05 032000 454F46",
        "E000100"
    ]
);

case!(
    no_instructions,
    "DATA\tSTART\t0\nA\tWORD\t-1\nB\tBYTE\tC'AB'\n\tEND\n",
    ["HDATA  000000000005", "T 000000 05 FFFFFF 4142", "E000000"]
);

case!(
    format4_numeric_has_no_modification,
    "P\tSTART\t0\n\t+LDA\t#70000\n\t+JSUB\tSUB\nSUB\tRSUB\n\tEND\n",
    [
        "HP     00000000000B",
        "T 000000 0B 01111170 4B100008 4F0000",
        "M00000505",
        "E000000"
    ]
);

case!(
    indirect_and_indexed,
    "P\tSTART\t4096\nA\tLDA\t@PTR\n\tLDA\tTAB,X\nPTR\tWORD\t0\nTAB\tRESB\t3\n\tEND\tA\n",
    [
        "HP     00100000000C",
        "T 001000 09 022003 03A003 000000",
        "E001000"
    ]
);

case!(
    start_is_decimal,
    "P\tSTART\t1000\n\tRSUB\n\tEND\n",
    ["HP     0003E8000003", "T 0003E8 03 4F0000", "E0003E8"]
);

case!(
    negative_immediate,
    "P\tSTART\t0\n\tCOMP\t#-1\n\t+LDA\t#-2\n\tEND\n",
    ["HP     000000000007", "T 000000 07 290FFF 011FFFFE", "E000000"]
);

#[test]
fn one_pass_image_matches_two_pass() {
    for source in [PROG, COPY, LITERALS] {
        let two = assemble(source, &SICXE, Mode::TwoPass).unwrap();
        let one = assemble(source, &SICXE, Mode::OnePass).unwrap();
        assert_eq!(one.program.load(), two.program.load());
        assert_eq!(one.program.header(), two.program.header());
        assert_eq!(
            one.program.modifications().count(),
            two.program.modifications().count()
        );
        let codes = |listing: &[xeasm::Listed]| -> Vec<Vec<u8>> {
            listing.iter().map(|listed| listed.code.clone()).collect()
        };
        assert_eq!(codes(&one.listing), codes(&two.listing));
    }
}

#[test]
fn one_pass_records() {
    assert(
        PROG,
        Mode::OnePass,
        &[
            "HPROG  00000000000C",
            "T 000000 06 030000 0F0000",
            "T 000000 03 032003",
            "T 000006 03 000005",
            "T 000003 03 0F2003",
            "E000000",
        ],
    );
}

#[test]
fn one_pass_waits_for_base() {
    let source = "\
P\tSTART\t0
\tBASE\tTABLE
\tLDA\tTABLE
\tLDA\tFAR
\tRESB\t4096
TABLE\tWORD\t1
FAR\tWORD\t2
\tEND
";
    let two = assemble(source, &SICXE, Mode::TwoPass).unwrap();
    let one = assemble(source, &SICXE, Mode::OnePass).unwrap();
    assert_eq!(one.program.load(), two.program.load());
    let image: Vec<u8> = two.program.load().into_values().take(6).collect();
    assert_eq!(image, vec![0x03, 0x40, 0x00, 0x03, 0x40, 0x03]);
}

#[test]
fn duplicate_symbol() {
    let source = "P\tSTART\t0\nA\tWORD\t1\nA\tWORD\t2\n\tLDA\tA\n\tEND\n";
    let assembly = assemble(source, &SICXE, Mode::TwoPass).unwrap();
    assert!(assembly.has_error());
    let levels: Vec<Level> = assembly.diags.iter().map(|d| d.level).collect();
    assert_eq!(levels, vec![Level::Error, Level::Note]);
    assert!(matches!(
        assembly.diags[0].error,
        Some(Error::DuplicateSymbol(_))
    ));
    assert_eq!(assembly.diags[0].line, 3);
    assert_eq!(assembly.diags[1].line, 2);
    // first definition wins: LDA A at 6, A at 0
    assert_eq!(assembly.listing[3].code, vec![0x03, 0x2F, 0xF7]);
}

#[test]
fn invalid_operation_continues() {
    let source = "P\tSTART\t0\n\tFOO\t1\n\tLDA\t#1\n\tEND\n";
    let assembly = assemble(source, &SICXE, Mode::TwoPass).unwrap();
    assert!(assembly.has_error());
    assert!(matches!(
        assembly.diags[0].error,
        Some(Error::InvalidOperation(_))
    ));
    assert_eq!(
        assembly.program.to_string(),
        "HP     000000000003\nT 000000 03 010001\nE000000\n"
    );
}

#[test]
fn malformed_constant_has_no_size() {
    let source = "P\tSTART\t0\nBAD\tBYTE\tX'ABC'\nOK\tWORD\t1\n\tLDA\t=Q'1'\n\tEND\n";
    let assembly = assemble(source, &SICXE, Mode::TwoPass).unwrap();
    let errors: Vec<usize> = assembly.diags.iter().map(|d| d.line).collect();
    assert_eq!(errors, vec![2, 4]);
    assert_eq!(assembly.listing[2].stmt.addr(), Some(0));
    // the broken literal resolves to the end of the program
    assert_eq!(assembly.listing[3].code, vec![0x03, 0x20, 0x00]);
}

#[test]
fn missing_end_and_trailing_source() {
    let source = "P\tSTART\t0\n\tLDA\t=X'01'\n";
    let assembly = assemble(source, &SICXE, Mode::TwoPass).unwrap();
    assert!(!assembly.has_error());
    assert_eq!(assembly.diags[0].level, Level::Warn);
    assert_eq!(
        assembly.program.to_string(),
        "HP     000000000004\nT 000000 04 032000 01\nE000000\n"
    );

    let source = "P\tSTART\t0\n\tRSUB\n\tEND\n\tRSUB\n";
    let assembly = assemble(source, &SICXE, Mode::OnePass).unwrap();
    assert_eq!(assembly.diags.len(), 1);
    assert_eq!(assembly.diags[0].level, Level::Warn);
    assert_eq!(assembly.diags[0].line, 4);
}

#[test]
fn missing_start() {
    for mode in [Mode::TwoPass, Mode::OnePass] {
        assert!(matches!(
            fatal("\tLDA\t#1\n\tEND\n", mode),
            Error::MissingStart
        ));
        assert!(matches!(fatal("", mode), Error::MissingStart));
    }
}

#[test]
fn undefined_symbol() {
    let source = "P\tSTART\t0\n\tLDA\tNOWHERE\n\tEND\n";
    for mode in [Mode::TwoPass, Mode::OnePass] {
        match fatal(source, mode) {
            Error::UndefinedSymbol(name) => assert_eq!(name, "NOWHERE"),
            err => panic!("unexpected {:?}", err),
        }
    }
    assert!(matches!(
        fatal("P\tSTART\t0\n\tRSUB\n\tEND\tGONE\n", Mode::TwoPass),
        Error::UndefinedSymbol(_)
    ));
}

#[test]
fn out_of_range_without_base() {
    let source = "P\tSTART\t0\n\tLDA\tFAR\n\tRESB\t4096\nFAR\tWORD\t1\n\tEND\n";
    for mode in [Mode::TwoPass, Mode::OnePass] {
        assert!(matches!(
            fatal(source, mode),
            Error::DisplacementOutOfRange(..)
        ));
    }
    assert!(matches!(
        fatal("P\tSTART\t0\n\tLDA\t#4096\n\tEND\n", Mode::TwoPass),
        Error::DisplacementOutOfRange(..)
    ));
}

#[test]
fn invalid_register() {
    assert!(matches!(
        fatal("P\tSTART\t0\n\tCLEAR\tQ\n\tEND\n", Mode::TwoPass),
        Error::InvalidRegister(_)
    ));
}

#[test]
fn reservation_past_memory() {
    let source = "P\tSTART\t0\nBUF\tRESB\t16777216\nX\tWORD\t1\n\tEND\n";
    for mode in [Mode::TwoPass, Mode::OnePass] {
        let assembly = assemble(source, &SICXE, mode).unwrap();
        assert!(assembly.has_error());
        assert_eq!(assembly.diags.len(), 1);
        assert_eq!(assembly.diags[0].line, 2);
        assert!(matches!(
            assembly.diags[0].error,
            Some(Error::AddressOverflow(_))
        ));
        assert_eq!(
            assembly.program.to_string(),
            "HP     000000000003\nT 000000 03 000001\nE000000\n"
        );
    }
}

#[test]
fn statement_past_memory_is_not_emitted() {
    let source = "P\tSTART\t1048573\n\tRSUB\n\tRSUB\n\tEND\n";
    let assembly = assemble(source, &SICXE, Mode::TwoPass).unwrap();
    let lines: Vec<usize> = assembly.diags.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![3]);
    assert_eq!(
        assembly.program.to_string(),
        "HP     0FFFFD000003\nT 0FFFFD 03 4F0000\nE0FFFFD\n"
    );
}

#[test]
fn word_out_of_range() {
    let source = "P\tSTART\t0\nX\tWORD\t16777217\nY\tWORD\t-8388608\n\tEND\n";
    let assembly = assemble(source, &SICXE, Mode::TwoPass).unwrap();
    assert_eq!(assembly.diags.len(), 1);
    assert!(matches!(
        &assembly.diags[0].error,
        Some(Error::InvalidNumber(s)) if s == "16777217"
    ));
    assert_eq!(
        assembly.program.to_string(),
        "HP     000000000006\nT 000000 06 000000 800000\nE000000\n"
    );
}
