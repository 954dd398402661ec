//! Style rules the behaviors rely on, injected at start-up.

use stylist::GlobalStyle;

use crate::controller::PageController;
use crate::error::PageError;

/// Grid container, card class, and the `nth-child` positions that get an
/// increasing transition delay.
const STAGGERED: &[(&str, &str, &[u32])] = &[
    (".problems-grid", ".problem-card", &[1, 2, 3, 4]),
    (".benefits-grid", ".benefit-card", &[1, 2, 3]),
    // Steps alternate with arrow elements in the solution visual.
    (".solution-visual", ".solution-step", &[1, 3, 5]),
    (".steps-container", ".step", &[1, 2, 3]),
];

const SR_ONLY: &str = r#"
.sr-only {
    position: absolute;
    width: 1px;
    height: 1px;
    padding: 0;
    margin: -1px;
    overflow: hidden;
    clip: rect(0, 0, 0, 0);
    white-space: nowrap;
    border: 0;
}
"#;

/// One rule per position, delays 0.1s apart starting at 0.1s.
pub fn stagger_rules(container: &str, item: &str, positions: &[u32], revealed: &str) -> String {
    positions
        .iter()
        .enumerate()
        .map(|(i, nth)| {
            format!(
                "{} {}:nth-child({}).{} {{ transition-delay: {:.1}s; }}\n",
                container,
                item,
                nth,
                revealed,
                0.1 * (i as f64 + 1.0)
            )
        })
        .collect()
}

pub fn animation_css(animated_selector: &str, revealed: &str, active: &str) -> String {
    let items: Vec<&str> = animated_selector.split(',').map(str::trim).collect();
    let hidden = items.join(",\n");
    let shown = items
        .iter()
        .map(|s| format!("{}.{}", s, revealed))
        .collect::<Vec<_>>()
        .join(",\n");

    let mut css = format!(
        r#"
{hidden} {{
    opacity: 0;
    transform: translateY(30px);
    transition: all 0.6s cubic-bezier(0.4, 0, 0.2, 1);
}}

{shown} {{
    opacity: 1;
    transform: translateY(0);
}}

.nav-link.{active} {{
    color: var(--color-primary);
    font-weight: 600;
}}
"#
    );
    for (container, item, positions) in STAGGERED {
        css.push_str(&stagger_rules(container, item, positions, revealed));
    }
    css
}

pub fn setup(controller: &PageController) -> Result<(), PageError> {
    let config = controller.config();
    GlobalStyle::new(animation_css(
        config.animated_selector,
        config.revealed_class,
        config.active_class,
    ))?;
    GlobalStyle::new(SR_ONLY)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagger_delays_follow_position_order() {
        let css = stagger_rules(".solution-visual", ".solution-step", &[1, 3, 5], "animate-in");
        let lines: Vec<&str> = css.lines().collect();
        let rule = |nth: u32, delay: &str| {
            let selector = format!(".solution-visual .solution-step:nth-child({}).animate-in", nth);
            format!("{} {{ transition-delay: {}s; }}", selector, delay)
        };
        assert_eq!(lines, vec![rule(1, "0.1"), rule(3, "0.2"), rule(5, "0.3")]);
    }

    #[test]
    fn animation_css_covers_every_card_class() {
        let selector = ".problem-card, .benefit-card, .solution-step, .step";
        let css = animation_css(selector, "animate-in", "active");
        for class in [".problem-card", ".benefit-card", ".solution-step", ".step"] {
            assert!(css.contains(&format!("{}.animate-in", class)), "{}", class);
        }
        assert!(css.contains(".nav-link.active {"));
        let last_problem = ".problems-grid .problem-card:nth-child(4).animate-in";
        assert!(css.contains(&format!("{} {{ transition-delay: 0.4s; }}", last_problem)));
    }
}
