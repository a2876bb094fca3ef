use crate::domain::calendar::days_in_month;
use crate::domain::entities::{Nurse, RelaxationSuggestion, Rules};
use crate::domain::rules::default_demand_for_day;

/// Structural relaxations offered when no feasible roster exists. Advisory
/// only; nothing here retries the solve.
pub fn suggest_relaxations(nurses: &[Nurse], rules: &Rules) -> Vec<RelaxationSuggestion> {
    let all_days = days_in_month(rules.year, rules.month);

    // supply of DAY-capable nurses, judged on base attributes
    let day_capable = nurses.iter().filter(|n| n.day_ok != Some(false)).count() as u32;

    let mut lower_days = Vec::new();
    for date in &all_days {
        let demand = default_demand_for_day(rules, *date, &rules.holidays);
        if day_capable < demand.day_min {
            lower_days.push(*date);
        }
    }

    let mut suggestions = Vec::new();
    if !lower_days.is_empty() {
        lower_days.truncate(7);
        suggestions.push(RelaxationSuggestion::RelaxDayMin {
            amount: 1,
            dates: lower_days,
            reason: "日勤の必要最小人数が供給可能人数を上回っています".to_string(),
        });
    }

    suggestions.push(RelaxationSuggestion::AllowWeekendDayWithoutLeader {
        scope: "weekend_holiday".to_string(),
        reason: "土日祝で日勤のリーダー確保が困難な場合の暫定緩和".to_string(),
    });

    suggestions.push(RelaxationSuggestion::IncreaseOffQuotaForNoncritical {
        reason: "連勤・夜勤制約のトレードオフ調整の候補".to_string(),
    });

    if let Some(pair) = rules.forbidden_pairs.night.first() {
        suggestions.push(RelaxationSuggestion::ExceptionForbiddenPairOnSpecificDay {
            pair: pair.clone(),
            dates: Vec::new(),
            reason: "夜勤構成が成立しない日に限定した例外候補".to_string(),
        });
    }

    suggestions
}
