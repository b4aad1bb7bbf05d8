use criterion::{black_box, criterion_group, criterion_main, Criterion};

const WORKLOAD: &str = r#"
LET total: Integer = 0;
LET label: String = "sum";
DEF add(n: Integer) : Integer DO
    total = total + n;
    RETURN total;
END
DEF main() DO
    FOR i IN range(0, 100) DO
        IF i < 50 DO
            add(i);
        ELSE
            add(i * 2);
        END
    END
    print(label + ": done");
    RETURN 0;
END
"#;

fn bench_frontend(c: &mut Criterion) {
    let tokens = plc::lex(WORKLOAD).expect("lex");

    c.bench_function("frontend_lex", |b| {
        b.iter(|| {
            let out = plc::lex(black_box(WORKLOAD)).expect("lex");
            black_box(out);
        })
    });

    c.bench_function("frontend_parse_only", |b| {
        b.iter(|| {
            let out = plc::parse(black_box(&tokens)).expect("parse");
            black_box(out);
        })
    });

    c.bench_function("frontend_lex_parse_analyze", |b| {
        b.iter(|| {
            let tokens = plc::lex(black_box(WORKLOAD)).expect("lex");
            let mut source = plc::parse(&tokens).expect("parse");
            plc::analyze(&mut source).expect("analyze");
            black_box(source);
        })
    });
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
