use criterion::{black_box, criterion_group, criterion_main, Criterion};
use supera::enrollment::EnrollmentForm;
use supera::models::{PreCadastro, PreCadastroStatus};
use supera::plan::PlanId;

fn lead() -> PreCadastro {
    PreCadastro {
        id: 1,
        first_name: "Bianca".into(),
        last_name: "Almeida".into(),
        email: "bianca@example.com".into(),
        telefone: "(11)98765-4321".into(),
        data_nascimento: None,
        cpf: None,
        turma: Some(2),
        status: PreCadastroStatus::Compareceu,
        criado_em: None,
    }
}

fn resolver_benchmark(c: &mut Criterion) {
    c.bench_function("build_enrollment_payload", |b| {
        b.iter(|| {
            let mut form = EnrollmentForm::new(lead());
            form.cpf = "123.456.789-00".into();
            form.set_dia_vencimento(5).expect("5 is an allowed due day");
            form.select_plan(PlanId::Weekly2);
            form.toggle_day(1).expect("first day under quota");
            form.toggle_day(3).expect("second day under quota");

            let payload = form.build_payload().expect("form is complete");
            assert_eq!(payload.dia_vencimento, 5);
            assert_eq!(payload.dias_habilitados.as_deref(), Some(&[1i64, 3][..]));
            black_box(payload);
        })
    });

    c.bench_function("displayed_first_charge_total", |b| {
        let mut form = EnrollmentForm::new(lead());
        form.select_plan(PlanId::Weekly3);
        form.plano_familia = true;
        b.iter(|| {
            let total = form.total_primeira_cobranca_display();
            assert_eq!(total, "230.00");
            black_box(total);
        })
    });
}

criterion_group!(benches, resolver_benchmark);
criterion_main!(benches);
