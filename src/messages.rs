//! User-facing texts (Ukrainian)

use crate::pricing::{PricedResult, PricingInputs, STITCH_PRICE, TAPE_PRICE};
use crate::state_machine::effect::{Button, Keyboard, OutboundMessage};
use crate::state_machine::event::BEGIN_TAG;
use crate::state_machine::step::{InputKind, Step};

pub const MENU: &str = "Що будемо рахувати?";
pub const MENU_BUTTON: &str = "Розрахувати: Карнізи";
pub const CANCELLED: &str = "Розрахунок скасовано.";

/// Reply to `/start`: the first question, with a one-button menu to
/// restart the form from the top
pub fn menu() -> OutboundMessage {
    let button = Button {
        label: MENU_BUTTON.to_string(),
        tag: BEGIN_TAG.to_string(),
    };
    let text = format!("{MENU}\n\n{}", prompt_text(Step::first()));
    OutboundMessage::text(text).with_keyboard(Keyboard::new(vec![button], 1))
}

pub fn cancelled() -> OutboundMessage {
    OutboundMessage::text(CANCELLED)
}

fn prompt_text(step: Step) -> &'static str {
    match step {
        Step::WaitingLength => "Введи довжину карнизу (метри). Приклад: 3 або 3.0",
        Step::WaitingCoeff => "Тепер вибери коефіцієнт зборки:",
        Step::WaitingCurtainPrice => "Введи ціну штори (за одиницю).",
        Step::WaitingMetraj2 => {
            "Введи метраж ткані для другого додатку (число, яке в твоїй формулі було '6'):"
        }
        Step::WaitingMultiplier => "Тепер вибери множник (2, 3, 4 або 5):",
        Step::WaitingExtra => "Тепер виберіть додаткову константу (6 або 12):",
        Step::WaitingTapeMetraj => {
            "Введи метраж тасьми (як правило це може дорівнювати метражу ткані з першого кроку):"
        }
    }
}

/// The question for `step`, with its keyboard for choice steps
pub fn prompt(step: Step) -> OutboundMessage {
    attach_keyboard(step, OutboundMessage::text(prompt_text(step)))
}

/// Prompt for `next`, prefixed with an echo of the value just accepted
/// where the conversation confirms it.
pub fn advance(completed: Step, value: f64, next: Step) -> OutboundMessage {
    let text = match completed {
        Step::WaitingLength => format!("Довжина карнизу: {}\n\n{}", plain(value), prompt_text(next)),
        Step::WaitingCoeff => format!("Обрано коефіцієнт: {}\n\n{}", plain(value), prompt_text(next)),
        _ => prompt_text(next).to_string(),
    };
    attach_keyboard(next, OutboundMessage::text(text))
}

/// Re-prompt after text that did not parse as a number
pub fn invalid_number(step: Step) -> OutboundMessage {
    let text = match step {
        Step::WaitingLength => "Некоректне число. Введи довжину у форматі 3 або 3.5.",
        Step::WaitingCurtainPrice => "Некоректна ціна. Введи число (наприклад 415).",
        Step::WaitingMetraj2 => "Некоректне число. Введи метраж як число (наприклад 6).",
        Step::WaitingTapeMetraj => "Некоректне число для тасьми. Введи число (наприклад 6 або 6.0).",
        Step::WaitingCoeff | Step::WaitingMultiplier | Step::WaitingExtra => {
            return prompt(step);
        }
    };
    OutboundMessage::text(text)
}

fn attach_keyboard(step: Step, message: OutboundMessage) -> OutboundMessage {
    match step.kind() {
        InputKind::Choice(group) => message.with_keyboard(Keyboard::for_choice(group)),
        InputKind::FreeNumber => message,
    }
}

/// Final calculation breakdown
pub fn report(inputs: &PricingInputs, result: &PricedResult) -> OutboundMessage {
    let PricedResult {
        fabric_metraj,
        curtain_cost,
        stitching_cost,
        tape_cost,
        total,
    } = *result;

    let text = format!(
        "Розрахунок:\n\n\
         1) Метраж ткані (length * coeff): {length} * {coeff} = {fabric_metraj:.3}\n\
         2) Вартість штори: {fabric_metraj:.3} * {curtain_price} = {curtain_cost:.2}\n\n\
         3) Другий термін: (metraj2 * multiplier + extra) * {stitch:.0} = \
         ({metraj2} * {multiplier:.0} + {extra:.0}) * {stitch:.0} = {stitching_cost:.2}\n\n\
         4) Тасьма: {tape_metraj} * {tape_price} = {tape_cost:.2}\n\n\
         ПІДСУМОК: {curtain_cost:.2} + {stitching_cost:.2} + {tape_cost:.2} = {total:.2} грн",
        length = plain(inputs.length),
        coeff = plain(inputs.coeff),
        curtain_price = plain(inputs.curtain_price),
        metraj2 = plain(inputs.metraj2),
        multiplier = inputs.multiplier,
        extra = inputs.extra,
        stitch = STITCH_PRICE,
        tape_metraj = plain(inputs.tape_metraj),
        tape_price = plain(TAPE_PRICE),
    );
    OutboundMessage::text(text)
}

/// Whole numbers keep one decimal place (`3.0`) so echoed inputs read as
/// measurements; other values print in shortest form.
fn plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
