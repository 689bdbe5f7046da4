use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::{EnrollmentPayload, MessageResponse};
use crate::client::ApiClient;
use crate::error::{AppError, Result, ValidationError};
use crate::models::{PreCadastro, PreCadastroStatus};
use crate::plan::{self, PaymentGroupType, PlanId};
use crate::users;

/// Flat enrollment fee charged on the first payment. Covers the training
/// shirt, per the contract text.
fn taxa_matricula() -> BigDecimal {
    BigDecimal::new(9000.into(), 2) // R$ 90,00
}

fn desconto_familia() -> BigDecimal {
    BigDecimal::new(1000.into(), 2) // R$ 10,00
}

pub fn format_brl(valor: &BigDecimal) -> String {
    valor.with_scale(2).to_string()
}

/// Where the form sits in its submission lifecycle. `Idle` is the absence of
/// a form: one is only created when staff opens the matrícula action, so the
/// in-memory states start at `Editing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Submitting,
    Error(String),
}

/// In-memory matrícula form for one pré-cadastro. Exclusively owned by the
/// staff interaction that opened it; discarded on cancel, dropped after a
/// successful submission.
#[derive(Debug, Clone)]
pub struct EnrollmentForm {
    pub instance: Uuid,
    precadastro: PreCadastro,
    phase: FormPhase,

    pub cpf: String,
    dia_vencimento: Option<u8>,
    pub ja_aluno: bool,
    plano: Option<PlanId>,
    /// Text field, pre-seeded with the plan's base price on plan selection.
    pub valor_primeira_mensalidade: String,
    pub plano_familia: bool,
    /// Insertion-ordered; truncation on plan change keeps the earliest picks.
    dias_habilitados: Vec<i64>,

    allowed_due_days: Vec<u8>,
    dias_ct_permitidos: Option<Vec<i64>>,
}

impl EnrollmentForm {
    pub fn new(precadastro: PreCadastro) -> Self {
        debug!("opening matrícula form for pré-cadastro {}", precadastro.id);
        Self {
            instance: Uuid::new_v4(),
            precadastro,
            phase: FormPhase::Editing,
            cpf: String::new(),
            dia_vencimento: None,
            ja_aluno: false,
            plano: None,
            valor_primeira_mensalidade: String::new(),
            plano_familia: false,
            dias_habilitados: Vec::new(),
            allowed_due_days: vec![1, 5, 10],
            dias_ct_permitidos: None,
        }
    }

    /// Restrict the day picker to the CT's configured operating days.
    pub fn with_dias_permitidos(mut self, dias: Vec<i64>) -> Self {
        self.dias_ct_permitidos = Some(dias);
        self
    }

    /// Override the CT's billing due-day options (defaults to 1/5/10).
    pub fn with_due_days(mut self, dias: Vec<u8>) -> Self {
        self.allowed_due_days = dias;
        self
    }

    pub fn precadastro(&self) -> &PreCadastro {
        &self.precadastro
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn plano(&self) -> Option<PlanId> {
        self.plano
    }

    pub fn dia_vencimento(&self) -> Option<u8> {
        self.dia_vencimento
    }

    pub fn dias_habilitados(&self) -> &[i64] {
        &self.dias_habilitados
    }

    /// The fee/discount section is not rendered for students that already
    /// train at the CT.
    pub fn collects_first_payment(&self) -> bool {
        !self.ja_aluno
    }

    pub fn payment_group(&self) -> PaymentGroupType {
        if self.plano_familia {
            PaymentGroupType::Family
        } else {
            PaymentGroupType::Individual
        }
    }

    pub fn set_dia_vencimento(&mut self, dia: u8) -> Result<()> {
        if !self.allowed_due_days.contains(&dia) {
            return Err(ValidationError::InvalidDueDay(dia).into());
        }
        self.dia_vencimento = Some(dia);
        Ok(())
    }

    /// Activates a plan: truncates the picked days to the new quota (keeping
    /// the earliest picks in their original order) and re-seeds the first
    /// payment with the plan's base price, discarding any manual edit.
    pub fn select_plan(&mut self, plano: PlanId) {
        let entry = plan::lookup(plano);
        self.plano = Some(plano);
        self.dias_habilitados.truncate(entry.weekly_sessions);
        self.valor_primeira_mensalidade = format_brl(&entry.base_price);
    }

    /// Adds or removes a weekday. Removal always succeeds; adding past the
    /// active plan's quota is rejected without mutating the set.
    pub fn toggle_day(&mut self, dia: i64) -> Result<()> {
        if let Some(pos) = self.dias_habilitados.iter().position(|d| *d == dia) {
            self.dias_habilitados.remove(pos);
            return Ok(());
        }
        if let Some(permitidos) = &self.dias_ct_permitidos {
            if !permitidos.contains(&dia) {
                return Err(ValidationError::DayNotAllowed(dia).into());
            }
        }
        let plano = self.plano.ok_or(ValidationError::MissingPlan)?;
        let quota = plan::lookup(plano).weekly_sessions;
        if self.dias_habilitados.len() >= quota {
            return Err(AppError::QuotaExceeded { plan: plano, quota });
        }
        self.dias_habilitados.push(dia);
        Ok(())
    }

    /// First payment as typed by the user. Unparseable text counts as zero
    /// for display purposes only; submission validation is separate.
    fn first_payment_parsed(&self) -> BigDecimal {
        BigDecimal::from_str(self.valor_primeira_mensalidade.trim())
            .unwrap_or_else(|_| BigDecimal::zero())
    }

    /// Informational "total with enrollment fee" shown next to the form. The
    /// server computes the authoritative charge; no floor is applied here.
    pub fn total_primeira_cobranca(&self) -> BigDecimal {
        let desconto = match self.payment_group() {
            PaymentGroupType::Family => desconto_familia(),
            PaymentGroupType::Individual => BigDecimal::zero(),
        };
        (self.first_payment_parsed() - desconto + taxa_matricula()).with_scale(2)
    }

    pub fn total_primeira_cobranca_display(&self) -> String {
        format_brl(&self.total_primeira_cobranca())
    }

    /// First failing check wins; nothing is sent to the server on failure.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !self.precadastro.has_cpf() && self.cpf.trim().is_empty() {
            return Err(ValidationError::MissingCpf);
        }
        if self.dia_vencimento.is_none() {
            return Err(ValidationError::MissingDueDay);
        }
        let Some(plano) = self.plano else {
            return Err(ValidationError::MissingPlan);
        };
        if !self.ja_aluno && self.valor_primeira_mensalidade.trim().is_empty() {
            return Err(ValidationError::MissingFirstPayment);
        }
        if plano.requires_day_selection() {
            let quota = plan::lookup(plano).weekly_sessions;
            if self.dias_habilitados.len() != quota {
                return Err(ValidationError::DayQuotaMismatch { plan: plano, quota });
            }
        }
        Ok(())
    }

    pub fn build_payload(&self) -> Result<EnrollmentPayload> {
        self.validate()?;
        let plano = self.plano.ok_or(ValidationError::MissingPlan)?;
        let dia_vencimento = self.dia_vencimento.ok_or(ValidationError::MissingDueDay)?;

        let valor_primeira_mensalidade = if self.ja_aluno {
            None
        } else {
            Some(self.first_payment_parsed().with_scale(2))
        };
        let dias_habilitados = if self.dias_habilitados.is_empty() {
            None
        } else {
            Some(self.dias_habilitados.clone())
        };
        let cpf = if self.precadastro.has_cpf() {
            None
        } else {
            Some(users::somente_digitos(&self.cpf))
        };

        Ok(EnrollmentPayload {
            cpf,
            dia_vencimento,
            plano,
            plano_familia: self.plano_familia,
            ja_aluno: self.ja_aluno,
            valor_primeira_mensalidade,
            dias_habilitados,
        })
    }

    /// Validates, builds the payload and moves to `Submitting`. A second call
    /// while a submission is in flight fails without touching the form — the
    /// at-most-one-in-flight policy is enforced here, not in the UI.
    pub fn begin_submit(&mut self) -> Result<EnrollmentPayload> {
        if self.phase == FormPhase::Submitting {
            return Err(AppError::SubmissionInFlight);
        }
        let payload = self.build_payload()?;
        self.phase = FormPhase::Submitting;
        Ok(payload)
    }

    pub fn finish_success(&mut self) {
        self.precadastro.status = PreCadastroStatus::Matriculado;
        self.phase = FormPhase::Editing;
    }

    /// Keeps every field as typed so the user can correct and resubmit.
    pub fn finish_error(&mut self, message: String) {
        self.phase = FormPhase::Error(message);
    }
}

#[derive(Debug)]
pub struct EnrollmentOutcome {
    /// Server acknowledgement, shown as the success banner.
    pub message: String,
    /// Fresh pré-cadastro list; the local copy is not trusted after a write.
    pub precadastros: Vec<PreCadastro>,
}

/// Submits a finalized matrícula and refreshes the pré-cadastro list.
///
/// On API failure the form moves to `Error` with the server's message and the
/// error is returned for inline display.
pub async fn submit_matricula(
    client: &ApiClient,
    form: &mut EnrollmentForm,
) -> Result<EnrollmentOutcome> {
    let payload = form.begin_submit()?;
    let precadastro_id = form.precadastro().id;
    info!("finalizing matrícula for pré-cadastro {}", precadastro_id);

    let submitted: Result<MessageResponse> = client
        .post_json(
            &format!("usuarios/finalizar-agendamento/{}/", precadastro_id),
            &payload,
        )
        .await;

    match submitted {
        Ok(ack) => {
            form.finish_success();
            let precadastros = users::listar_precadastros(client).await?;
            Ok(EnrollmentOutcome { message: ack.message, precadastros })
        }
        Err(err) => {
            form.finish_error(err.to_string());
            Err(err)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn lead(cpf: Option<&str>) -> PreCadastro {
        PreCadastro {
            id: 42,
            first_name: "Marina".into(),
            last_name: "Costa".into(),
            email: "marina@example.com".into(),
            telefone: "(11)98765-4321".into(),
            data_nascimento: None,
            cpf: cpf.map(String::from),
            turma: Some(3),
            status: PreCadastroStatus::Compareceu,
            criado_em: None,
        }
    }

    fn brl(cents: i64) -> BigDecimal {
        BigDecimal::new(cents.into(), 2)
    }

    #[test]
    fn select_plan_seeds_first_payment() {
        let mut form = EnrollmentForm::new(lead(None));
        form.select_plan(PlanId::Weekly2);
        assert_eq!(form.valor_primeira_mensalidade, "130.00");
        form.valor_primeira_mensalidade = "99.90".into();
        form.select_plan(PlanId::Weekly1);
        // a manual edit does not survive a plan change
        assert_eq!(form.valor_primeira_mensalidade, "110.00");
    }

    #[test]
    fn quota_is_never_exceeded() {
        let mut form = EnrollmentForm::new(lead(None));
        form.select_plan(PlanId::Weekly2);
        form.toggle_day(1).unwrap();
        form.toggle_day(3).unwrap();
        let err = form.toggle_day(5).unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded { plan: PlanId::Weekly2, quota: 2 }));
        // rejection did not mutate the set
        assert_eq!(form.dias_habilitados(), &[1, 3]);
        assert_eq!(
            err.to_string(),
            "O plano 2x permite 2 dia(s)."
        );
    }

    #[test]
    fn removal_always_succeeds_and_reopens_a_slot() {
        let mut form = EnrollmentForm::new(lead(None));
        form.select_plan(PlanId::Weekly1);
        form.toggle_day(4).unwrap();
        form.toggle_day(4).unwrap(); // remove
        assert!(form.dias_habilitados().is_empty());
        form.toggle_day(6).unwrap();
        assert_eq!(form.dias_habilitados(), &[6]);
    }

    #[test]
    fn plan_change_truncates_preserving_order() {
        let mut form = EnrollmentForm::new(lead(None));
        form.select_plan(PlanId::Weekly3);
        form.toggle_day(2).unwrap();
        form.toggle_day(4).unwrap();
        form.toggle_day(6).unwrap();
        form.select_plan(PlanId::Weekly2);
        assert_eq!(form.dias_habilitados(), &[2, 4]);
    }

    #[test]
    fn toggle_requires_an_active_plan() {
        let mut form = EnrollmentForm::new(lead(None));
        assert!(matches!(
            form.toggle_day(1).unwrap_err(),
            AppError::Validation(ValidationError::MissingPlan)
        ));
    }

    #[test]
    fn ct_allowed_days_gate_additions_only() {
        let mut form = EnrollmentForm::new(lead(None)).with_dias_permitidos(vec![1, 3]);
        form.select_plan(PlanId::Weekly2);
        assert!(matches!(
            form.toggle_day(5).unwrap_err(),
            AppError::Validation(ValidationError::DayNotAllowed(5))
        ));
        form.toggle_day(1).unwrap();
        form.toggle_day(1).unwrap(); // removal is never gated
        assert!(form.dias_habilitados().is_empty());
    }

    #[test]
    fn displayed_total_with_enrollment_fee() {
        let mut form = EnrollmentForm::new(lead(None));
        form.select_plan(PlanId::Weekly3);
        assert_eq!(form.total_primeira_cobranca(), brl(24000)); // 150 + 90
        form.plano_familia = true;
        assert_eq!(form.total_primeira_cobranca(), brl(23000)); // 150 - 10 + 90
        assert_eq!(form.total_primeira_cobranca_display(), "230.00");
    }

    #[test]
    fn unparseable_first_payment_displays_as_zero() {
        let mut form = EnrollmentForm::new(lead(None));
        form.select_plan(PlanId::Weekly1);
        form.valor_primeira_mensalidade = "cem reais".into();
        assert_eq!(form.total_primeira_cobranca(), brl(9000)); // 0 + 90
        form.plano_familia = true;
        // no floor clamp: the informational total may go below the fee
        assert_eq!(form.total_primeira_cobranca(), brl(8000));
    }

    #[test]
    fn validation_order_short_circuits() {
        let mut form = EnrollmentForm::new(lead(None));
        assert_eq!(form.validate(), Err(ValidationError::MissingCpf));

        form.cpf = "123.456.789-00".into();
        assert_eq!(form.validate(), Err(ValidationError::MissingDueDay));

        form.set_dia_vencimento(5).unwrap();
        assert_eq!(form.validate(), Err(ValidationError::MissingPlan));

        form.select_plan(PlanId::Weekly2);
        form.valor_primeira_mensalidade.clear();
        assert_eq!(form.validate(), Err(ValidationError::MissingFirstPayment));

        form.valor_primeira_mensalidade = "130.00".into();
        assert_eq!(
            form.validate(),
            Err(ValidationError::DayQuotaMismatch { plan: PlanId::Weekly2, quota: 2 })
        );

        form.toggle_day(1).unwrap();
        assert_eq!(
            form.validate(),
            Err(ValidationError::DayQuotaMismatch { plan: PlanId::Weekly2, quota: 2 })
        );
        form.toggle_day(3).unwrap();
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn cpf_on_file_skips_the_cpf_check_and_is_not_resent() {
        let mut form = EnrollmentForm::new(lead(Some("98765432100")));
        assert_eq!(form.validate(), Err(ValidationError::MissingDueDay));

        form.set_dia_vencimento(1).unwrap();
        form.select_plan(PlanId::Weekly3);
        let payload = form.build_payload().unwrap();
        assert_eq!(payload.cpf, None);
    }

    #[test]
    fn existing_student_never_submits_a_first_payment() {
        let mut form = EnrollmentForm::new(lead(Some("98765432100")));
        form.set_dia_vencimento(10).unwrap();
        form.select_plan(PlanId::Weekly3);
        form.ja_aluno = true;
        form.valor_primeira_mensalidade = "150.00".into();
        assert!(!form.collects_first_payment());
        let payload = form.build_payload().unwrap();
        assert_eq!(payload.valor_primeira_mensalidade, None);
        assert!(payload.ja_aluno);
    }

    #[test]
    fn invalid_due_day_is_rejected() {
        let mut form = EnrollmentForm::new(lead(None));
        assert!(matches!(
            form.set_dia_vencimento(17).unwrap_err(),
            AppError::Validation(ValidationError::InvalidDueDay(17))
        ));
        assert_eq!(form.dia_vencimento(), None);
    }

    #[test]
    fn full_payload_for_a_new_student_on_3x() {
        let mut form = EnrollmentForm::new(lead(None));
        form.cpf = "123.456.789-00".into();
        form.set_dia_vencimento(5).unwrap();
        form.select_plan(PlanId::Weekly3);
        form.valor_primeira_mensalidade = "150.00".into();

        let payload = form.build_payload().unwrap();
        assert_eq!(
            payload,
            EnrollmentPayload {
                cpf: Some("12345678900".into()),
                dia_vencimento: 5,
                plano: PlanId::Weekly3,
                plano_familia: false,
                ja_aluno: false,
                valor_primeira_mensalidade: Some(brl(15000)),
                dias_habilitados: None,
            }
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("dias_habilitados").is_none());
    }

    #[test]
    fn double_submit_is_blocked_mechanically() {
        let mut form = EnrollmentForm::new(lead(Some("98765432100")));
        form.set_dia_vencimento(1).unwrap();
        form.select_plan(PlanId::Weekly3);

        form.begin_submit().unwrap();
        assert!(form.is_submitting());
        let again = form.begin_submit().unwrap_err();
        assert!(matches!(again, AppError::SubmissionInFlight));
        // the in-flight attempt is untouched
        assert!(form.is_submitting());
    }

    #[test]
    fn failed_submission_preserves_the_form_for_correction() {
        let mut form = EnrollmentForm::new(lead(None));
        form.cpf = "12345678900".into();
        form.set_dia_vencimento(5).unwrap();
        form.select_plan(PlanId::Weekly2);
        form.toggle_day(1).unwrap();
        form.toggle_day(3).unwrap();

        form.begin_submit().unwrap();
        form.finish_error("CPF já cadastrado.".into());
        assert_eq!(form.phase(), &FormPhase::Error("CPF já cadastrado.".into()));
        assert_eq!(form.dias_habilitados(), &[1, 3]);
        assert_eq!(form.cpf, "12345678900");
        // and the user can try again
        form.begin_submit().unwrap();
    }

    #[test]
    fn success_marks_the_lead_enrolled_locally() {
        let mut form = EnrollmentForm::new(lead(Some("98765432100")));
        form.set_dia_vencimento(1).unwrap();
        form.select_plan(PlanId::Weekly3);
        form.begin_submit().unwrap();
        form.finish_success();
        assert_eq!(form.precadastro().status, PreCadastroStatus::Matriculado);
    }
}
