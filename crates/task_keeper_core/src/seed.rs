//! crates/task_keeper_core/src/seed.rs
//!
//! Sample tasks handed to a user record on its very first creation.

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::domain::{Task, UserProfile};
use crate::ports::TaskSeeder;

pub const DEFAULT_SAMPLE_COUNT: usize = 50;

const SAMPLE_TITLES: [&str; 50] = [
    "Comprar mantimentos",
    "Estudar Rust",
    "Reunião com equipe",
    "Fazer exercícios",
    "Limpar casa",
    "Enviar e-mail",
    "Atualizar projeto",
    "Planejar viagem",
    "Ler livro",
    "Organizar documentos",
    "Fazer backup",
    "Comprar presente",
    "Marcar consulta",
    "Pagar contas",
    "Estudar para prova",
    "Revisar código",
    "Atualizar LinkedIn",
    "Preparar apresentação",
    "Comprar roupas",
    "Manutenção carro",
    "Planejar orçamento",
    "Treinar novo hobby",
    "Organizar armário",
    "Testar nova receita",
    "Visitar família",
    "Agendar reunião",
    "Atualizar software",
    "Planejar evento",
    "Fazer doação",
    "Estudar idioma",
    "Comprar material",
    "Organizar desktop",
    "Fazer check-up",
    "Planejar férias",
    "Treinar meditação",
    "Atualizar currículo",
    "Comprar móveis",
    "Organizar festa",
    "Estudar mercado",
    "Fazer networking",
    "Revisar contrato",
    "Planejar dieta",
    "Comprar eletrônicos",
    "Organizar garagem",
    "Estudar investimentos",
    "Fazer caminhada",
    "Atualizar blog",
    "Planejar curso",
    "Comprar ingressos",
    "Organizar biblioteca",
];

const DESCRIPTION_TEMPLATES: [&str; 5] = [
    "Descrição detalhada da tarefa: {title} - precisa ser feita com atenção aos detalhes",
    "Tarefa importante: {title} - revisar prazos e entregáveis",
    "Atividade pendente: {title} - agendar com antecedência",
    "Tarefa urgente: {title} - completar até o final do dia",
    "Planejamento: {title} - organizar etapas e recursos",
];

/// Fills a new collection with `count` pending tasks drawn from a fixed pool of
/// titles and description templates.
#[derive(Debug, Clone, Copy)]
pub struct SampleTaskSeeder {
    count: usize,
}

impl SampleTaskSeeder {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Default for SampleTaskSeeder {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_COUNT)
    }
}

impl TaskSeeder for SampleTaskSeeder {
    fn seed_tasks(&self, _user: &UserProfile) -> Vec<Task> {
        let mut rng = thread_rng();
        (0..self.count)
            .map(|_| {
                // Both pools are non-empty constants.
                let title = SAMPLE_TITLES.choose(&mut rng).copied().unwrap_or_default();
                let template = DESCRIPTION_TEMPLATES
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or("{title}");
                Task::new(title, template.replace("{title}", title))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use std::collections::HashSet;

    fn profile() -> UserProfile {
        UserProfile {
            user_id: "7".to_string(),
            name: "Bia".to_string(),
            login: "bia".to_string(),
            access_token: "tok".to_string(),
            refresh_token: None,
        }
    }

    #[test]
    fn seeds_requested_number_of_pending_tasks() {
        let tasks = SampleTaskSeeder::new(12).seed_tasks(&profile());
        assert_eq!(tasks.len(), 12);
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Pendente));
        assert!(tasks.iter().all(|t| t.description.contains(&t.title)));

        let ids: HashSet<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn default_seeds_fifty() {
        assert_eq!(SampleTaskSeeder::default().seed_tasks(&profile()).len(), 50);
    }
}
